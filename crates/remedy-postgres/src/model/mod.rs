//! Database models for all tables.
//!
//! Each model maps one table; conversions into `remedy-core` domain types
//! live next to the model they read from.

mod contributor;
mod document_version;
mod file_resource;
mod remediation_event;
mod version_file;
mod work;

pub use contributor::{NewVersionContributor, VersionContributor};
pub use document_version::{DocumentVersion, NewDocumentVersion};
pub use file_resource::{FileResource, NewFileResource, UpdateRemediation};
pub use remediation_event::{NewRemediationEvent, RemediationEvent};
pub use version_file::VersionFile;
pub use work::Work;
