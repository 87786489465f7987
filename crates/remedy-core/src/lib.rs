#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
pub mod artifact;
pub mod mail;
pub mod queue;
pub mod remediation;
pub mod store;
pub mod ticket;
pub mod types;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use store::{DocumentStore, SharedStore};
