//! Remediation orchestration.
//!
//! The [`RemediationTrigger`] runs inside the download request and only
//! enqueues work; every other service runs inside a queue worker.

mod dispatcher;
mod eligibility;
mod escalation;
mod failure;
mod notification;
mod result_builder;
mod trigger;

pub use dispatcher::{DispatchSummary, SubmissionDispatcher};
pub use eligibility::{EligibilityCheck, Ineligibility};
pub use escalation::FailureEscalation;
pub use failure::FailureRecorder;
pub use notification::{NotificationSummary, RemediationNotifier};
pub use result_builder::ResultBuilder;
pub use trigger::{DownloadRequest, RemediationTrigger, TriggerOutcome};

/// Tracing target for the remediation workflow.
pub const TRACING_TARGET: &str = "remedy_server::service::remediation";
