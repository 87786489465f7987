//! Database query repositories.
//!
//! Every repository is implemented for [`PgConnection`], so the same methods
//! are available on a pooled [`PgConn`] and inside a transaction closure.
//!
//! [`PgConnection`]: crate::PgConnection
//! [`PgConn`]: crate::PgConn

pub mod document_version;
pub mod file_resource;
pub mod remediation_event;
pub mod work;

pub use document_version::DocumentVersionRepository;
pub use file_resource::FileResourceRepository;
pub use remediation_event::RemediationEventRepository;
pub use work::WorkRepository;
