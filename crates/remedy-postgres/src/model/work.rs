//! Work model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use remedy_core::types;
use uuid::Uuid;

use crate::schema::works;

/// Work model representing the parent of every document version.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = works)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Work {
    /// Unique work identifier.
    pub id: Uuid,
    /// Work title.
    pub title: String,
    /// Display name of the depositor.
    pub depositor_name: String,
    /// Email address of the depositor.
    pub depositor_email: Option<String>,
    /// Whether curators are reviewing the work by hand.
    pub under_manual_review: bool,
    /// Timestamp when the work was created.
    pub created_at: Timestamp,
    /// Timestamp when the work was last updated.
    pub updated_at: Timestamp,
}

impl From<Work> for types::Work {
    fn from(work: Work) -> Self {
        Self {
            id: work.id,
            title: work.title,
            depositor_name: work.depositor_name,
            depositor_email: work.depositor_email,
            under_manual_review: work.under_manual_review,
            created_at: work.created_at.into(),
        }
    }
}
