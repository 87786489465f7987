//! Remediation state enumeration.

use diesel_derive_enum::DbEnum;
use remedy_core::types;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Defines the remediation state of a file resource.
///
/// This enumeration corresponds to the `REMEDIATION_STATE` PostgreSQL enum.
/// The variant payloads of [`types::RemediationStatus`] live in the
/// neighbouring nullable columns.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::RemediationState"]
pub enum RemediationState {
    /// File was never submitted
    #[db_rename = "not_started"]
    #[serde(rename = "not_started")]
    #[default]
    NotStarted,

    /// A job is outstanding
    #[db_rename = "submitted"]
    #[serde(rename = "submitted")]
    Submitted,

    /// The job produced an artifact
    #[db_rename = "succeeded"]
    #[serde(rename = "succeeded")]
    Succeeded,

    /// The job failed
    #[db_rename = "failed"]
    #[serde(rename = "failed")]
    Failed,
}

impl From<types::RemediationState> for RemediationState {
    fn from(value: types::RemediationState) -> Self {
        match value {
            types::RemediationState::NotStarted => Self::NotStarted,
            types::RemediationState::Submitted => Self::Submitted,
            types::RemediationState::Succeeded => Self::Succeeded,
            types::RemediationState::Failed => Self::Failed,
        }
    }
}
