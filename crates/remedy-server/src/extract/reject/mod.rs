//! Extractors whose rejections render as [`Error`] responses.
//!
//! [`Error`]: crate::handler::Error

mod enhanced_json;
mod enhanced_path;

pub use enhanced_json::Json;
pub use enhanced_path::Path;
