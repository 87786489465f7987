//! Per-file remediation state machine.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use super::NewFileResource;
use crate::{Error, Result};

/// Remediation status of a single file.
///
/// Every transition goes through [`submit`], [`succeed`] or [`fail`]; a file
/// never holds more than one live correlation id.
///
/// [`submit`]: RemediationStatus::submit
/// [`succeed`]: RemediationStatus::succeed
/// [`fail`]: RemediationStatus::fail
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RemediationStatus {
    /// The file was never submitted.
    #[default]
    NotStarted,
    /// A job is outstanding at the remediation service.
    Submitted {
        correlation_id: String,
        submitted_at: Timestamp,
    },
    /// The job produced a remediated artifact.
    Succeeded {
        correlation_id: String,
        output_url: String,
        completed_at: Timestamp,
    },
    /// The job, or the handling of its result, failed.
    Failed {
        correlation_id: String,
        reason: String,
        failed_at: Timestamp,
    },
}

/// Flat discriminant of [`RemediationStatus`], used for storage and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, AsRefStr, IntoStaticStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RemediationState {
    /// See [`RemediationStatus::NotStarted`].
    NotStarted,
    /// See [`RemediationStatus::Submitted`].
    Submitted,
    /// See [`RemediationStatus::Succeeded`].
    Succeeded,
    /// See [`RemediationStatus::Failed`].
    Failed,
}

impl RemediationStatus {
    /// Returns the flat state.
    pub fn state(&self) -> RemediationState {
        match self {
            Self::NotStarted => RemediationState::NotStarted,
            Self::Submitted { .. } => RemediationState::Submitted,
            Self::Succeeded { .. } => RemediationState::Succeeded,
            Self::Failed { .. } => RemediationState::Failed,
        }
    }

    /// Correlation id of the most recent submission, if any.
    ///
    /// Webhook results are matched against this id; earlier ids are stale.
    pub fn current_correlation_id(&self) -> Option<&str> {
        match self {
            Self::NotStarted => None,
            Self::Submitted { correlation_id, .. }
            | Self::Succeeded { correlation_id, .. }
            | Self::Failed { correlation_id, .. } => Some(correlation_id),
        }
    }

    /// Correlation id of a job that is still outstanding.
    pub fn live_correlation_id(&self) -> Option<&str> {
        match self {
            Self::Submitted { correlation_id, .. } => Some(correlation_id),
            _ => None,
        }
    }

    /// Failure timestamp shown to operators.
    pub fn failed_at(&self) -> Option<Timestamp> {
        match self {
            Self::Failed { failed_at, .. } => Some(*failed_at),
            _ => None,
        }
    }

    /// Returns whether `correlation_id` is the current one.
    #[inline]
    pub fn holds(&self, correlation_id: &str) -> bool {
        self.current_correlation_id() == Some(correlation_id)
    }

    /// Records a new submission, superseding any earlier job.
    pub fn submit(&self, correlation_id: impl Into<String>, at: Timestamp) -> Result<Self> {
        let correlation_id = correlation_id.into();
        if correlation_id.trim().is_empty() {
            return Err(Error::invalid_input().with_message("correlation id must not be empty"));
        }

        Ok(Self::Submitted {
            correlation_id,
            submitted_at: at,
        })
    }

    /// Records a successful job.
    pub fn succeed(
        &self,
        correlation_id: &str,
        output_url: impl Into<String>,
        at: Timestamp,
    ) -> Result<Self> {
        match self {
            Self::Submitted { .. } if self.holds(correlation_id) => Ok(Self::Succeeded {
                correlation_id: correlation_id.to_owned(),
                output_url: output_url.into(),
                completed_at: at,
            }),
            _ if self.holds(correlation_id) => Err(Error::conflict().with_message(format!(
                "job {correlation_id} cannot succeed from state {}",
                self.state()
            ))),
            _ => Err(Self::stale(correlation_id)),
        }
    }

    /// Records a failed job, overwriting any earlier failure timestamp.
    pub fn fail(
        &self,
        correlation_id: &str,
        reason: impl Into<String>,
        at: Timestamp,
    ) -> Result<Self> {
        match self {
            Self::Submitted { .. } | Self::Failed { .. } if self.holds(correlation_id) => {
                Ok(Self::Failed {
                    correlation_id: correlation_id.to_owned(),
                    reason: reason.into(),
                    failed_at: at,
                })
            }
            _ if self.holds(correlation_id) => Err(Error::conflict().with_message(format!(
                "job {correlation_id} cannot fail from state {}",
                self.state()
            ))),
            _ => Err(Self::stale(correlation_id)),
        }
    }

    fn stale(correlation_id: &str) -> Error {
        Error::not_found().with_message(format!(
            "no file currently holds correlation id {correlation_id}"
        ))
    }
}

/// Event types delivered by the remediation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, AsRefStr, IntoStaticStr, EnumString)]
pub enum EventType {
    /// The job finished and produced an artifact.
    #[serde(rename = "job.succeeded")]
    #[strum(serialize = "job.succeeded")]
    JobSucceeded,
    /// The job failed.
    #[serde(rename = "job.failed")]
    #[strum(serialize = "job.failed")]
    JobFailed,
}

/// Named result of applying a successful remediation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, IntoStaticStr)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RemediationOutcome {
    /// A new published, auto-remediated version was created.
    VersionCreated { version_id: Uuid },
    /// The artifact would not change the version; nothing was created.
    Unchanged,
    /// The event was already applied by an earlier delivery.
    AlreadyProcessed,
    /// The work moved on since submission; the artifact no longer applies.
    TargetMovedOn,
}

impl RemediationOutcome {
    /// Returns the created version, if any.
    pub fn version_id(&self) -> Option<Uuid> {
        match self {
            Self::VersionCreated { version_id } => Some(*version_id),
            _ => None,
        }
    }
}

/// How the result of a remediation job should be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemediationResolution {
    /// Create a new version with one file replaced.
    ///
    /// The store builds on the work's latest published version at commit
    /// time, which may be newer than `base_version_id` when a sibling file
    /// was applied in the meantime.
    Replace {
        /// Version the artifact was compared against.
        base_version_id: Uuid,
        replaced_file_id: Uuid,
        replacement: NewFileResource,
    },
    /// The constructed version would equal its predecessor.
    Unchanged,
    /// No published version carries the file anymore.
    TargetMovedOn,
}

/// Everything the store needs to apply one success event atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationCommit {
    /// Correlation id reported by the webhook.
    pub correlation_id: String,
    /// Location of the remediated artifact.
    pub output_url: String,
    /// Completion timestamp.
    pub completed_at: Timestamp,
    /// What to do with the artifact.
    pub resolution: RemediationResolution,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn submitted(id: &str) -> RemediationStatus {
        RemediationStatus::NotStarted
            .submit(id, Timestamp::now())
            .expect("submission is always allowed")
    }

    #[test]
    fn submission_supersedes_previous_job() -> anyhow::Result<()> {
        let first = submitted("uuid-1");
        let second = first.submit("uuid-2", Timestamp::now())?;

        assert_eq!(second.live_correlation_id(), Some("uuid-2"));
        assert!(!second.holds("uuid-1"));

        let stale = second.succeed("uuid-1", "https://example.com/out.pdf", Timestamp::now());
        assert_eq!(stale.map_err(|e| e.kind), Err(ErrorKind::NotFound));
        Ok(())
    }

    #[test]
    fn success_requires_live_job() -> anyhow::Result<()> {
        let done = submitted("uuid-2").succeed("uuid-2", "https://example.com/out.pdf", Timestamp::now())?;
        assert_eq!(done.state(), RemediationState::Succeeded);
        assert_eq!(done.live_correlation_id(), None);
        assert_eq!(done.current_correlation_id(), Some("uuid-2"));

        let again = done.succeed("uuid-2", "https://example.com/out.pdf", Timestamp::now());
        assert_eq!(again.map_err(|e| e.kind), Err(ErrorKind::Conflict));
        Ok(())
    }

    #[test]
    fn failure_overwrites_timestamp() -> anyhow::Result<()> {
        let first_at = Timestamp::from_second(1_700_000_000)?;
        let second_at = Timestamp::from_second(1_700_000_600)?;

        let failed = submitted("uuid-3").fail("uuid-3", "boom", first_at)?;
        assert_eq!(failed.failed_at(), Some(first_at));

        let refailed = failed.fail("uuid-3", "boom again", second_at)?;
        assert_eq!(refailed.failed_at(), Some(second_at));
        Ok(())
    }

    #[test]
    fn never_submitted_file_has_no_current_job() {
        let status = RemediationStatus::NotStarted;
        let result = status.fail("uuid-4", "boom", Timestamp::now());
        assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::NotFound));
        assert!(status.submit("  ", Timestamp::now()).is_err());
    }

    #[test]
    fn event_type_parses_wire_names() {
        assert_eq!("job.succeeded".parse::<EventType>().ok(), Some(EventType::JobSucceeded));
        assert_eq!("job.failed".parse::<EventType>().ok(), Some(EventType::JobFailed));
        assert!("job.started".parse::<EventType>().is_err());
        assert_eq!(EventType::JobFailed.to_string(), "job.failed");
    }
}
