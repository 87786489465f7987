//! Reqwest-based HTTP clients for the remediation orchestrator.
//!
//! ```rust,ignore
//! use remedy_core::remediation::RemediationService;
//! use remedy_reqwest::{RemediationClient, RemediationConfig, ReqwestClient, ReqwestConfig};
//!
//! let http = ReqwestClient::new(ReqwestConfig::default())?;
//! let client = RemediationClient::new(http, config)?;
//! let service = RemediationService::new(client);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod connect;
mod error;
mod service;

pub use crate::connect::{ReqwestClient, ReqwestConfig, TRACING_TARGET};
pub use crate::error::{Error, Result};
pub use crate::service::{
    MailClient, MailConfig, RemediationClient, RemediationConfig, TicketClient, TicketConfig,
};
