//! Version contributor model.

use diesel::prelude::*;
use remedy_core::types::Contributor;
use uuid::Uuid;

use crate::schema::version_contributors;

/// One contributor of a document version, in display order.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = version_contributors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VersionContributor {
    /// Version the contributor belongs to.
    pub version_id: Uuid,
    /// Zero-based display position.
    pub position: i32,
    /// Display name.
    pub display_name: String,
    /// Contact address.
    pub email: Option<String>,
}

/// Data for inserting a contributor.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = version_contributors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewVersionContributor {
    /// Version the contributor belongs to.
    pub version_id: Uuid,
    /// Zero-based display position.
    pub position: i32,
    /// Display name.
    pub display_name: String,
    /// Contact address.
    pub email: Option<String>,
}

impl NewVersionContributor {
    /// Copies a contributor row onto another version.
    pub fn copy_to(row: &VersionContributor, version_id: Uuid) -> Self {
        Self {
            version_id,
            position: row.position,
            display_name: row.display_name.clone(),
            email: row.email.clone(),
        }
    }
}

impl From<VersionContributor> for Contributor {
    fn from(row: VersionContributor) -> Self {
        Contributor::new(row.display_name, row.email)
    }
}
