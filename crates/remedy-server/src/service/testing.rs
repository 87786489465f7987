//! Service state wired to in-memory collaborators.

use std::sync::Arc;

use remedy_core::artifact::ArtifactStore;
use remedy_core::mail::MailService;
use remedy_core::queue::TaskQueue;
use remedy_core::remediation::RemediationService;
use remedy_core::ticket::TicketService;
use remedy_core::types::{Contributor, DocumentVersion, FileResource, PDF_MIME_TYPE, PublicationState};
use remedy_test::{
    MemoryArtifacts, MemoryStore, MockRemediation, RecordingMailer, RecordingQueue,
    RecordingTickets,
};
use url::Url;

use super::{Collaborators, RemediationSettings, ServiceState};
use crate::extract::ApiKey;

pub(crate) const WEBHOOK_KEY: &str = "webhook-secret";
pub(crate) const INTERNAL_KEY: &str = "internal-secret";
pub(crate) const BASE_URL: &str = "https://repository.example.edu/";

/// Fakes behind a [`ServiceState`], kept for inspection.
pub(crate) struct Harness {
    pub store: MemoryStore,
    pub remediation: MockRemediation,
    pub queue: RecordingQueue,
    pub tickets: RecordingTickets,
    pub mailer: RecordingMailer,
    pub state: ServiceState,
}

impl Harness {
    pub fn new(auto_remediation_enabled: bool) -> Self {
        let store = MemoryStore::new();
        let remediation = MockRemediation::new();
        let queue = RecordingQueue::new();
        let tickets = RecordingTickets::new();
        let mailer = RecordingMailer::new();

        let collaborators = Collaborators {
            store: Arc::new(store.clone()),
            queue: TaskQueue::new(queue.clone()),
            remediation: RemediationService::new(remediation.clone()),
            tickets: TicketService::new(tickets.clone()),
            mail: MailService::new(mailer.clone()),
            artifacts: ArtifactStore::new(MemoryArtifacts::new()),
        };

        let base_url = Url::parse(BASE_URL).expect("valid base url");
        let settings =
            RemediationSettings::new(base_url, ApiKey::new(WEBHOOK_KEY), ApiKey::new(INTERNAL_KEY))
                .with_auto_remediation(auto_remediation_enabled);

        Self {
            state: ServiceState::new(collaborators, settings),
            store,
            remediation,
            queue,
            tickets,
            mailer,
        }
    }

    /// Inserts a published version of a new work with one PDF.
    pub fn published_pdf(&self) -> (DocumentVersion, FileResource) {
        let work = self
            .store
            .insert_work("Field notes", Some("depositor@example.com"));
        let version = self.store.insert_version(
            work.id,
            PublicationState::Published,
            vec![Contributor::new("Ada", Some("ada@example.com".to_owned()))],
        );
        let file = self
            .store
            .insert_file(version.id, "thesis.pdf", PDF_MIME_TYPE, "aa");
        (version, file)
    }
}
