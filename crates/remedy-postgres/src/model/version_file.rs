//! Version/file membership model.

use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::version_files;

/// Attachment of a file to a version at a display position.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = version_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VersionFile {
    /// Version the file is attached to.
    pub version_id: Uuid,
    /// Attached file.
    pub file_id: Uuid,
    /// Zero-based display position.
    pub position: i32,
}
