//! Processed-event ledger repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::NewRemediationEvent;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for the processed-event ledger.
pub trait RemediationEventRepository {
    /// Inserts a ledger row unless one already exists.
    ///
    /// Returns `true` when this call claimed the event.
    fn claim_remediation_event(
        &mut self,
        event: NewRemediationEvent,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Returns whether a ledger row exists for the event.
    fn is_remediation_event_processed(
        &mut self,
        correlation_id: &str,
        event_type: &str,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Records the outcome of a claimed event.
    fn record_remediation_outcome(
        &mut self,
        correlation_id: &str,
        event_type: &str,
        outcome: &str,
    ) -> impl Future<Output = PgResult<()>> + Send;
}

impl RemediationEventRepository for PgConnection {
    async fn claim_remediation_event(&mut self, event: NewRemediationEvent) -> PgResult<bool> {
        use schema::remediation_events;

        let inserted = diesel::insert_into(remediation_events::table)
            .values(&event)
            .on_conflict_do_nothing()
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(inserted > 0)
    }

    async fn is_remediation_event_processed(
        &mut self,
        correlation_id: &str,
        event_type: &str,
    ) -> PgResult<bool> {
        use diesel::dsl::{exists, select};
        use schema::remediation_events::{self, dsl};

        select(exists(
            remediation_events::table
                .filter(dsl::correlation_id.eq(correlation_id))
                .filter(dsl::event_type.eq(event_type)),
        ))
        .get_result(self)
        .await
        .map_err(PgError::from)
    }

    async fn record_remediation_outcome(
        &mut self,
        correlation_id: &str,
        event_type: &str,
        outcome: &str,
    ) -> PgResult<()> {
        use schema::remediation_events::{self, dsl};

        diesel::update(remediation_events::table)
            .filter(dsl::correlation_id.eq(correlation_id))
            .filter(dsl::event_type.eq(event_type))
            .set(dsl::outcome.eq(outcome))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }
}
