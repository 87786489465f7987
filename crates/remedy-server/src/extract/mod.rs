//! HTTP request extractors with consistent rejections.
//!
//! - [`Json`]: JSON body with [`Error`] rejections
//! - [`Path`]: path parameters with [`Error`] rejections
//! - [`ApiKey`]: constant-time comparable `X-API-KEY` value
//!
//! [`Error`]: crate::handler::Error

mod api_key;
mod reject;

pub use crate::extract::api_key::{API_KEY_HEADER, ApiKey};
pub use crate::extract::reject::{Json, Path};
