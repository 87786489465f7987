//! Application state and dependency injection.

mod config;
mod remediation;
mod settings;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use remedy_core::SharedStore;
use remedy_core::artifact::ArtifactStore;
use remedy_core::mail::MailService;
use remedy_core::queue::TaskQueue;
use remedy_core::remediation::{RemediationService, Unconfigured};
use remedy_core::ticket::TicketService;
use remedy_reqwest::{MailClient, RemediationClient, ReqwestClient, TicketClient};

pub use crate::service::config::{Backends, ServiceConfig};
pub use crate::service::remediation::{
    DispatchSummary, DownloadRequest, EligibilityCheck, FailureEscalation, FailureRecorder,
    Ineligibility, NotificationSummary, RemediationNotifier, RemediationTrigger, ResultBuilder,
    SubmissionDispatcher, TRACING_TARGET, TriggerOutcome,
};
pub use crate::service::settings::RemediationSettings;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Tracing target for state assembly at startup.
pub const TRACING_TARGET_STARTUP: &str = "remedy_server::service::startup";

/// Collaborators the orchestration services are built from.
#[derive(Clone)]
pub struct Collaborators {
    /// Works, versions and files.
    pub store: SharedStore,
    /// Durable task queue.
    pub queue: TaskQueue,
    /// External remediation API.
    pub remediation: RemediationService,
    /// Ticketing API.
    pub tickets: TicketService,
    /// Mail relay.
    pub mail: MailService,
    /// Remediated artifact storage.
    pub artifacts: ArtifactStore,
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection) and by the
/// queue workers.
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // Collaborators:
    pub store: SharedStore,
    pub queue: TaskQueue,
    pub settings: RemediationSettings,

    // Orchestration services:
    pub trigger: RemediationTrigger,
    pub dispatcher: SubmissionDispatcher,
    pub result_builder: ResultBuilder,
    pub failures: FailureRecorder,
    pub escalation: FailureEscalation,
    pub notifier: RemediationNotifier,
}

impl ServiceState {
    /// Wires the orchestration services to their collaborators.
    pub fn new(collaborators: Collaborators, settings: RemediationSettings) -> Self {
        let Collaborators {
            store,
            queue,
            remediation,
            tickets,
            mail,
            artifacts,
        } = collaborators;

        Self {
            trigger: RemediationTrigger::new(store.clone(), queue.clone(), settings.clone()),
            dispatcher: SubmissionDispatcher::new(
                store.clone(),
                remediation.clone(),
                settings.clone(),
            ),
            result_builder: ResultBuilder::new(
                store.clone(),
                remediation,
                artifacts,
                queue.clone(),
            ),
            failures: FailureRecorder::new(store.clone()),
            escalation: FailureEscalation::new(store.clone(), tickets.clone()),
            notifier: RemediationNotifier::new(store.clone(), tickets, mail, settings.clone()),

            store,
            queue,
            settings,
        }
    }

    /// Initializes application state from configuration and connected
    /// backends.
    ///
    /// With auto-remediation disabled and no remediation endpoint configured,
    /// an [`Unconfigured`] provider is injected; operator resubmissions then
    /// fail with a configuration error.
    pub fn from_config(config: &ServiceConfig, backends: &Backends) -> Result<Self> {
        config.validate()?;

        let http = ReqwestClient::new(config.http.clone())?;
        let remediation = if config.auto_remediation_enabled || config.remediation.is_configured()
        {
            RemediationService::new(RemediationClient::new(http.clone(), &config.remediation)?)
        } else {
            tracing::warn!(
                target: TRACING_TARGET_STARTUP,
                "Remediation API is not configured; submissions will fail"
            );
            RemediationService::new(Unconfigured)
        };

        let collaborators = Collaborators {
            store: Arc::new(backends.postgres.clone()),
            queue: TaskQueue::new(backends.queue.clone()),
            remediation,
            tickets: TicketService::new(TicketClient::new(http.clone(), &config.tickets)?),
            mail: MailService::new(MailClient::new(http, &config.mail)?),
            artifacts: ArtifactStore::new(backends.artifacts.clone()),
        };

        let settings = config.settings();
        tracing::info!(
            target: TRACING_TARGET_STARTUP,
            auto_remediation_enabled = settings.auto_remediation_enabled(),
            public_base_url = %settings.public_base_url(),
            "Service state initialized"
        );

        Ok(Self::new(collaborators, settings))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// Collaborators:
impl_di!(store: SharedStore);
impl_di!(queue: TaskQueue);
impl_di!(settings: RemediationSettings);

// Orchestration services:
impl_di!(trigger: RemediationTrigger);
impl_di!(dispatcher: SubmissionDispatcher);
impl_di!(result_builder: ResultBuilder);
impl_di!(failures: FailureRecorder);
impl_di!(escalation: FailureEscalation);
impl_di!(notifier: RemediationNotifier);
