//! Support ticket boundary.

mod service;

use serde::{Deserialize, Serialize};
pub use service::TicketService;
use strum::{AsRefStr, Display};
use uuid::Uuid;

pub use crate::{Error, Result};

/// Tracing target for ticketing operations.
pub const TRACING_TARGET: &str = "remedy_core::ticket";

/// Ticket type tag understood by the ticketing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketKind {
    /// A remediation job failed and needs a human.
    RemediationFailed,
    /// An auto-remediated version was published.
    RemediationCompleted,
}

/// Ticket to be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Work the ticket refers to.
    pub work_id: Uuid,
    /// Ticket type tag.
    pub ticket_type: TicketKind,
    /// One-line summary.
    pub subject: String,
    /// Ticket body.
    pub body: String,
}

/// Reference to a created ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReceipt {
    /// Identifier assigned by the ticketing system.
    pub id: String,
}

/// Core trait for ticketing implementations.
#[async_trait::async_trait]
pub trait TicketProvider: Send + Sync {
    /// Opens a ticket.
    async fn create_ticket(&self, request: &TicketRequest) -> Result<TicketReceipt>;
}
