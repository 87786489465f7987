//! In-memory fakes of the remedy collaborator traits.
//!
//! Every fake is cheap to clone and clones share state, so a test can keep
//! one handle for assertions while the service under test owns another.

mod artifact;
mod interleaving;
mod mail;
mod queue;
mod remediation;
mod store;
mod ticket;

pub use artifact::MemoryArtifacts;
pub use interleaving::InterleavingStore;
pub use mail::RecordingMailer;
pub use queue::RecordingQueue;
pub use remediation::MockRemediation;
pub use store::MemoryStore;
pub use ticket::RecordingTickets;
