//! Ticket service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{Result, TRACING_TARGET, TicketProvider, TicketReceipt, TicketRequest};

/// Ticket service wrapper with observability.
#[derive(Clone)]
pub struct TicketService {
    inner: Arc<dyn TicketProvider>,
}

impl fmt::Debug for TicketService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketService").finish_non_exhaustive()
    }
}

impl TicketService {
    /// Create a new ticket service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: TicketProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Opens a ticket.
    pub async fn create_ticket(&self, request: &TicketRequest) -> Result<TicketReceipt> {
        let started_at = Instant::now();
        let result = self.inner.create_ticket(request).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(receipt) => tracing::info!(
                target: TRACING_TARGET,
                work_id = %request.work_id,
                ticket_type = %request.ticket_type,
                ticket_id = %receipt.id,
                elapsed_ms = elapsed.as_millis(),
                "Ticket created"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                work_id = %request.work_id,
                ticket_type = %request.ticket_type,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Ticket creation failed"
            ),
        }

        result
    }
}
