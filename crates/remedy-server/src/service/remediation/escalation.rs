use remedy_core::ticket::{TicketKind, TicketReceipt, TicketRequest, TicketService};
use remedy_core::{Error, Result, SharedStore};

use super::TRACING_TARGET;

/// Opens support tickets for failed remediation jobs.
#[derive(Debug, Clone)]
pub struct FailureEscalation {
    store: SharedStore,
    tickets: TicketService,
}

impl FailureEscalation {
    /// Creates a new escalation service.
    pub fn new(store: SharedStore, tickets: TicketService) -> Self {
        Self { store, tickets }
    }

    /// Creates a `remediation_failed` ticket for the work owning the job.
    ///
    /// Ticketing errors propagate, so the enclosing task is retried until a
    /// ticket exists.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, fields(correlation_id = %correlation_id))]
    pub async fn escalate(&self, correlation_id: &str, message: &str) -> Result<TicketReceipt> {
        let file = self
            .store
            .find_file_by_correlation_id(correlation_id)
            .await?
            .ok_or_else(|| {
                Error::not_found().with_message(format!(
                    "no file currently holds correlation id {correlation_id}"
                ))
            })?;

        let work = self.store.find_work(file.work_id).await?.ok_or_else(|| {
            Error::not_found().with_message(format!("work {} does not exist", file.work_id))
        })?;

        let request = TicketRequest {
            work_id: work.id,
            ticket_type: TicketKind::RemediationFailed,
            subject: format!("Auto-remediation failed: {}", work.title),
            body: format!(
                "The remediation service could not process {filename} (file {file_id}) \
                 of \"{title}\".\n\nJob: {correlation_id}\nReason: {message}\n",
                filename = file.filename,
                file_id = file.id,
                title = work.title,
            ),
        };

        let receipt = self.tickets.create_ticket(&request).await?;
        tracing::info!(
            target: TRACING_TARGET,
            work_id = %work.id,
            ticket_id = %receipt.id,
            "Remediation failure escalated"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::Timestamp;
    use remedy_core::types::{PDF_MIME_TYPE, PublicationState};
    use remedy_core::{DocumentStore, ErrorKind};
    use remedy_test::{MemoryStore, RecordingTickets};

    use super::*;

    #[tokio::test]
    async fn opens_failure_ticket_for_work() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let tickets = RecordingTickets::new();
        let work = store.insert_work("Field notes", None);
        let version = store.insert_version(work.id, PublicationState::Published, Vec::new());
        let file = store.insert_file(version.id, "thesis.pdf", PDF_MIME_TYPE, "aa");
        store
            .record_submission(file.id, "uuid-1", Timestamp::now())
            .await?;

        let escalation =
            FailureEscalation::new(Arc::new(store.clone()), TicketService::new(tickets.clone()));
        escalation.escalate("uuid-1", "Something went wrong").await?;

        let sent = tickets.tickets();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].work_id, work.id);
        assert_eq!(sent[0].ticket_type, TicketKind::RemediationFailed);
        assert!(sent[0].body.contains("Something went wrong"));
        assert!(sent[0].body.contains("thesis.pdf"));
        Ok(())
    }

    #[tokio::test]
    async fn ticketing_outage_propagates_as_retryable() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let tickets = RecordingTickets::new();
        tickets.set_failing(true);
        let work = store.insert_work("Field notes", None);
        let version = store.insert_version(work.id, PublicationState::Published, Vec::new());
        let file = store.insert_file(version.id, "thesis.pdf", PDF_MIME_TYPE, "aa");
        store
            .record_submission(file.id, "uuid-1", Timestamp::now())
            .await?;

        let escalation =
            FailureEscalation::new(Arc::new(store.clone()), TicketService::new(tickets.clone()));
        let error = escalation
            .escalate("uuid-1", "Something went wrong")
            .await
            .expect_err("ticketing is down");

        assert_eq!(error.kind, ErrorKind::NetworkError);
        assert!(error.is_retryable());
        Ok(())
    }
}
