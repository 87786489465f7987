//! Work repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::Work;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for work database operations.
pub trait WorkRepository {
    /// Finds a work by its unique identifier.
    fn find_work_by_id(
        &mut self,
        work_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Work>>> + Send;

    /// Finds a work and locks its row until the transaction ends.
    ///
    /// Serializes version creation within one work.
    fn lock_work_by_id(
        &mut self,
        work_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Work>>> + Send;
}

impl WorkRepository for PgConnection {
    async fn find_work_by_id(&mut self, work_id: Uuid) -> PgResult<Option<Work>> {
        use schema::works::{self, dsl};

        works::table
            .filter(dsl::id.eq(work_id))
            .select(Work::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn lock_work_by_id(&mut self, work_id: Uuid) -> PgResult<Option<Work>> {
        use schema::works::{self, dsl};

        works::table
            .filter(dsl::id.eq(work_id))
            .select(Work::as_select())
            .for_update()
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }
}
