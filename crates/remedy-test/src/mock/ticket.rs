//! Recording ticketing client.

use std::sync::{Arc, Mutex, MutexGuard};

use remedy_core::ticket::{TicketProvider, TicketReceipt, TicketRequest};
use remedy_core::{Error, Result};

#[derive(Debug, Default)]
struct State {
    tickets: Vec<TicketRequest>,
    failing: bool,
}

/// Ticketing client that keeps created tickets in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingTickets {
    inner: Arc<Mutex<State>>,
}

impl RecordingTickets {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes every following ticket creation fail.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Tickets created so far.
    pub fn tickets(&self) -> Vec<TicketRequest> {
        self.lock().tickets.clone()
    }
}

#[async_trait::async_trait]
impl TicketProvider for RecordingTickets {
    async fn create_ticket(&self, request: &TicketRequest) -> Result<TicketReceipt> {
        let mut state = self.lock();
        if state.failing {
            return Err(Error::network_error().with_message("ticketing API is unreachable"));
        }
        state.tickets.push(request.clone());
        Ok(TicketReceipt {
            id: format!("ticket-{}", state.tickets.len()),
        })
    }
}
