use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use uuid::Uuid;

/// Asynchronous unit of work executed by a queue worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum RemediationTask {
    /// Submit every qualifying file of a version.
    SubmitVersion { version_id: Uuid },
    /// Build a new version from a remediated artifact.
    BuildRemediatedVersion {
        correlation_id: String,
        output_url: String,
    },
    /// Open a ticket for a failed job.
    EscalateFailure {
        correlation_id: String,
        message: String,
    },
    /// Tell contributors and staff that a remediated version is available.
    NotifyRemediated { version_id: Uuid },
}

/// Discriminant of [`RemediationTask`], used in queue subjects and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, AsRefStr, IntoStaticStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    /// See [`RemediationTask::SubmitVersion`].
    SubmitVersion,
    /// See [`RemediationTask::BuildRemediatedVersion`].
    BuildRemediatedVersion,
    /// See [`RemediationTask::EscalateFailure`].
    EscalateFailure,
    /// See [`RemediationTask::NotifyRemediated`].
    NotifyRemediated,
}

impl RemediationTask {
    /// Returns the task kind.
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::SubmitVersion { .. } => TaskKind::SubmitVersion,
            Self::BuildRemediatedVersion { .. } => TaskKind::BuildRemediatedVersion,
            Self::EscalateFailure { .. } => TaskKind::EscalateFailure,
            Self::NotifyRemediated { .. } => TaskKind::NotifyRemediated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_is_tagged_by_kind() -> anyhow::Result<()> {
        let task = RemediationTask::BuildRemediatedVersion {
            correlation_id: "uuid-2".to_owned(),
            output_url: "https://example.com/out.pdf".to_owned(),
        };

        let value = serde_json::to_value(&task)?;
        assert_eq!(value["task"], "build_remediated_version");
        assert_eq!(value["correlation_id"], "uuid-2");
        assert_eq!(task.kind().as_ref(), "build_remediated_version");

        let parsed: RemediationTask = serde_json::from_value(value)?;
        assert_eq!(parsed, task);
        Ok(())
    }
}
