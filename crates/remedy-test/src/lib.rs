#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod mock;

pub use mock::{
    InterleavingStore, MemoryArtifacts, MemoryStore, MockRemediation, RecordingMailer,
    RecordingQueue, RecordingTickets,
};
