use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Parent of every document version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    /// Unique work identifier.
    pub id: Uuid,
    /// Human readable title.
    pub title: String,
    /// Display name of the original depositor.
    pub depositor_name: String,
    /// Email address of the original depositor.
    pub depositor_email: Option<String>,
    /// Set while curators review the work by hand; disables auto-remediation.
    pub under_manual_review: bool,
    /// Timestamp when the work was created.
    pub created_at: Timestamp,
}

/// A named contributor of a document version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// Display name.
    pub display_name: String,
    /// Email address, when the contributor can be contacted.
    pub email: Option<String>,
}

impl Contributor {
    /// Creates a new contributor.
    pub fn new(display_name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email,
        }
    }
}

/// Role of the actor whose download triggered an eligibility check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActorRole {
    /// Repository administrator.
    Admin,
    /// Authenticated, non-administrative user.
    User,
    /// Anonymous visitor.
    #[default]
    Anonymous,
}

impl ActorRole {
    /// Returns whether the actor is an administrator.
    #[inline]
    pub fn is_admin(self) -> bool {
        matches!(self, ActorRole::Admin)
    }
}
