//! Database enumerations and their conversions into domain types.

mod publication_state;
mod remediation_state;

pub use publication_state::PublicationState;
pub use remediation_state::RemediationState;
