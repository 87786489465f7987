use std::collections::HashSet;

use remedy_core::mail::{MailMessage, MailService};
use remedy_core::ticket::{TicketKind, TicketRequest, TicketService};
use remedy_core::types::{DocumentVersion, Work};
use remedy_core::{Error, Result, SharedStore};
use uuid::Uuid;

use super::TRACING_TARGET;
use crate::service::RemediationSettings;

/// What a notification run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSummary {
    /// Id of the audit ticket.
    pub ticket_id: String,
    /// Addresses that received the mail.
    pub delivered: Vec<String>,
    /// Addresses the mail relay refused.
    pub undelivered: Vec<String>,
}

/// Announces a new auto-remediated version.
#[derive(Debug, Clone)]
pub struct RemediationNotifier {
    store: SharedStore,
    tickets: TicketService,
    mail: MailService,
    settings: RemediationSettings,
}

impl RemediationNotifier {
    /// Creates a new notifier.
    pub fn new(
        store: SharedStore,
        tickets: TicketService,
        mail: MailService,
        settings: RemediationSettings,
    ) -> Self {
        Self {
            store,
            tickets,
            mail,
            settings,
        }
    }

    /// Distinct mail recipients of a version: its contributors, then the
    /// depositor.
    ///
    /// Addresses are compared case-insensitively; blank ones are skipped.
    pub fn recipients(version: &DocumentVersion, work: &Work) -> Vec<String> {
        let mut seen = HashSet::new();
        version
            .contributors
            .iter()
            .filter_map(|c| c.email.as_deref())
            .chain(work.depositor_email.as_deref())
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .filter(|address| seen.insert(address.to_lowercase()))
            .map(str::to_owned)
            .collect()
    }

    /// Creates the `remediation_completed` audit ticket and mails every
    /// recipient once.
    ///
    /// Ticketing errors propagate. Mail is best-effort: a refused address is
    /// logged and reported in the summary.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, fields(version_id = %version_id))]
    pub async fn notify(&self, version_id: Uuid) -> Result<NotificationSummary> {
        let version = self.store.find_version(version_id).await?.ok_or_else(|| {
            Error::not_found().with_message(format!("version {version_id} does not exist"))
        })?;

        let work = self.store.find_work(version.work_id).await?.ok_or_else(|| {
            Error::not_found().with_message(format!("work {} does not exist", version.work_id))
        })?;

        let link = self.settings.version_url(version.id)?;
        let ticket = self
            .tickets
            .create_ticket(&TicketRequest {
                work_id: work.id,
                ticket_type: TicketKind::RemediationCompleted,
                subject: format!("Auto-remediation completed: {}", work.title),
                body: format!(
                    "Version {number} of \"{title}\" was published with remediated files.\n\n{link}\n",
                    number = version.version_number,
                    title = work.title,
                ),
            })
            .await?;

        let mut summary = NotificationSummary {
            ticket_id: ticket.id,
            delivered: Vec::new(),
            undelivered: Vec::new(),
        };

        for to in Self::recipients(&version, &work) {
            let message = MailMessage {
                to: to.clone(),
                subject: format!("An accessible version of \"{}\" is available", work.title),
                text: format!(
                    "Hello,\n\nWe published an accessible version of \"{title}\" with \
                     remediated PDF files. You can find it here:\n\n{link}\n",
                    title = work.title,
                ),
            };

            match self.mail.send(&message).await {
                Ok(()) => summary.delivered.push(to),
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %error,
                        "Skipping recipient after mail failure"
                    );
                    summary.undelivered.push(to);
                }
            }
        }

        tracing::info!(
            target: TRACING_TARGET,
            ticket_id = %summary.ticket_id,
            delivered = summary.delivered.len(),
            undelivered = summary.undelivered.len(),
            "Remediation notification sent"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use remedy_core::types::{Contributor, PublicationState};
    use remedy_test::{MemoryStore, RecordingMailer, RecordingTickets};
    use url::Url;

    use super::*;
    use crate::extract::ApiKey;

    fn notifier(
        store: &MemoryStore,
        tickets: &RecordingTickets,
        mailer: &RecordingMailer,
    ) -> RemediationNotifier {
        let settings = RemediationSettings::new(
            Url::parse("https://repo.example.com").expect("valid url"),
            ApiKey::new("webhook"),
            ApiKey::new("internal"),
        );
        RemediationNotifier::new(
            Arc::new(store.clone()),
            TicketService::new(tickets.clone()),
            MailService::new(mailer.clone()),
            settings,
        )
    }

    fn contributors() -> Vec<Contributor> {
        vec![
            Contributor::new("Ada", Some("ada@example.com".to_owned())),
            Contributor::new("Ada again", Some("ADA@example.com".to_owned())),
            Contributor::new("Grace", None),
            Contributor::new("Linus", Some("linus@example.com".to_owned())),
        ]
    }

    #[tokio::test]
    async fn mails_each_distinct_address_once() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let tickets = RecordingTickets::new();
        let mailer = RecordingMailer::new();
        let work = store.insert_work("Field notes", Some("Linus@Example.com"));
        let version = store.insert_version(work.id, PublicationState::Published, contributors());

        let summary = notifier(&store, &tickets, &mailer).notify(version.id).await?;

        assert_eq!(
            mailer.recipients(),
            vec!["ada@example.com".to_owned(), "linus@example.com".to_owned()]
        );
        assert_eq!(summary.delivered.len(), 2);

        let link = format!("https://repo.example.com/versions/{}", version.id);
        assert!(mailer.sent().iter().all(|m| m.text.contains(&link)));

        let sent = tickets.tickets();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].ticket_type, TicketKind::RemediationCompleted);
        Ok(())
    }

    #[tokio::test]
    async fn refused_address_does_not_stop_others() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let tickets = RecordingTickets::new();
        let mailer = RecordingMailer::new();
        mailer.reject("ada@example.com");
        let work = store.insert_work("Field notes", Some("depositor@example.com"));
        let version = store.insert_version(work.id, PublicationState::Published, contributors());

        let summary = notifier(&store, &tickets, &mailer).notify(version.id).await?;

        assert_eq!(summary.undelivered, vec!["ada@example.com".to_owned()]);
        assert_eq!(
            summary.delivered,
            vec!["linus@example.com".to_owned(), "depositor@example.com".to_owned()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn ticketing_failure_sends_no_mail() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let tickets = RecordingTickets::new();
        tickets.set_failing(true);
        let mailer = RecordingMailer::new();
        let work = store.insert_work("Field notes", Some("depositor@example.com"));
        let version = store.insert_version(work.id, PublicationState::Published, contributors());

        let result = notifier(&store, &tickets, &mailer).notify(version.id).await;

        assert!(result.is_err());
        assert!(mailer.sent().is_empty());
        Ok(())
    }
}
