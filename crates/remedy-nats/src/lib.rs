#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for opening streams and buckets.
pub const TRACING_TARGET_CLIENT: &str = "remedy_nats::client";

/// Tracing target for artifact uploads and downloads.
pub const TRACING_TARGET_OBJECT: &str = "remedy_nats::object";

/// Tracing target for publishing, fetching and acknowledging tasks.
pub const TRACING_TARGET_QUEUE: &str = "remedy_nats::queue";

/// Tracing target for the server connection.
pub const TRACING_TARGET_CONNECTION: &str = "remedy_nats::connection";

mod client;
mod error;
pub mod object;
pub mod queue;

pub use async_nats::jetstream;
pub use client::{NatsClient, NatsConfig};
pub use error::{Error, Result};
