//! Document version repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{DocumentVersion, NewDocumentVersion, NewVersionContributor, VersionContributor};
use crate::types::PublicationState;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for document version database operations.
pub trait DocumentVersionRepository {
    /// Finds a version by its unique identifier.
    fn find_version_by_id(
        &mut self,
        version_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<DocumentVersion>>> + Send;

    /// Lists the contributors of a version in display order.
    fn list_version_contributors(
        &mut self,
        version_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<VersionContributor>>> + Send;

    /// Finds the published version with the highest number for a work.
    fn find_latest_published_version(
        &mut self,
        work_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<DocumentVersion>>> + Send;

    /// Sets `auto_remediation_started_at` unless it is already set.
    ///
    /// Returns `None` when the version does not exist, otherwise whether
    /// this call performed the write.
    fn mark_remediation_started(
        &mut self,
        version_id: Uuid,
        at: Timestamp,
    ) -> impl Future<Output = PgResult<Option<bool>>> + Send;

    /// Returns the number the next version of a work receives.
    fn next_version_number(&mut self, work_id: Uuid)
    -> impl Future<Output = PgResult<i32>> + Send;

    /// Inserts a version together with its contributors.
    fn create_version(
        &mut self,
        new_version: NewDocumentVersion,
        contributors: Vec<NewVersionContributor>,
    ) -> impl Future<Output = PgResult<DocumentVersion>> + Send;

    /// Points a version at the auto-remediated version produced from it.
    fn link_remediated_version(
        &mut self,
        version_id: Uuid,
        remediated_version_id: Uuid,
    ) -> impl Future<Output = PgResult<()>> + Send;
}

impl DocumentVersionRepository for PgConnection {
    async fn find_version_by_id(&mut self, version_id: Uuid) -> PgResult<Option<DocumentVersion>> {
        use schema::document_versions::{self, dsl};

        document_versions::table
            .filter(dsl::id.eq(version_id))
            .select(DocumentVersion::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_version_contributors(
        &mut self,
        version_id: Uuid,
    ) -> PgResult<Vec<VersionContributor>> {
        use schema::version_contributors::{self, dsl};

        version_contributors::table
            .filter(dsl::version_id.eq(version_id))
            .order(dsl::position.asc())
            .select(VersionContributor::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_latest_published_version(
        &mut self,
        work_id: Uuid,
    ) -> PgResult<Option<DocumentVersion>> {
        use schema::document_versions::{self, dsl};

        document_versions::table
            .filter(dsl::work_id.eq(work_id))
            .filter(dsl::publication_state.eq(PublicationState::Published))
            .order(dsl::version_number.desc())
            .select(DocumentVersion::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn mark_remediation_started(
        &mut self,
        version_id: Uuid,
        at: Timestamp,
    ) -> PgResult<Option<bool>> {
        use schema::document_versions::{self, dsl};

        let updated = diesel::update(document_versions::table)
            .filter(dsl::id.eq(version_id))
            .filter(dsl::auto_remediation_started_at.is_null())
            .set(dsl::auto_remediation_started_at.eq(Some(jiff_diesel::Timestamp::from(at))))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        if updated > 0 {
            return Ok(Some(true));
        }

        let exists = self.find_version_by_id(version_id).await?.is_some();
        Ok(exists.then_some(false))
    }

    async fn next_version_number(&mut self, work_id: Uuid) -> PgResult<i32> {
        use diesel::dsl::max;
        use schema::document_versions::{self, dsl};

        let current: Option<i32> = document_versions::table
            .filter(dsl::work_id.eq(work_id))
            .select(max(dsl::version_number))
            .first(self)
            .await
            .map_err(PgError::from)?;

        Ok(current.unwrap_or(0) + 1)
    }

    async fn create_version(
        &mut self,
        new_version: NewDocumentVersion,
        contributors: Vec<NewVersionContributor>,
    ) -> PgResult<DocumentVersion> {
        use schema::{document_versions, version_contributors};

        let version = diesel::insert_into(document_versions::table)
            .values(&new_version)
            .returning(DocumentVersion::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        if !contributors.is_empty() {
            diesel::insert_into(version_contributors::table)
                .values(&contributors)
                .execute(self)
                .await
                .map_err(PgError::from)?;
        }

        Ok(version)
    }

    async fn link_remediated_version(
        &mut self,
        version_id: Uuid,
        remediated_version_id: Uuid,
    ) -> PgResult<()> {
        use schema::document_versions::{self, dsl};

        diesel::update(document_versions::table)
            .filter(dsl::id.eq(version_id))
            .set(dsl::remediated_version_id.eq(Some(remediated_version_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }
}
