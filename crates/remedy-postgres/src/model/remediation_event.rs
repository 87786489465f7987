//! Processed-event ledger model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::remediation_events;

/// A webhook event that has been applied.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = remediation_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RemediationEvent {
    /// Correlation id of the job.
    pub correlation_id: String,
    /// Wire name of the event type.
    pub event_type: String,
    /// Name of the outcome recorded when the event was applied.
    pub outcome: String,
    /// Timestamp when the event was applied.
    pub processed_at: Timestamp,
}

/// Data for claiming an event.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = remediation_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRemediationEvent {
    /// Correlation id of the job.
    pub correlation_id: String,
    /// Wire name of the event type.
    pub event_type: String,
    /// Outcome name, updated once the event is applied.
    pub outcome: String,
}
