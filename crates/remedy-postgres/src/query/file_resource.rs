//! File resource repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use remedy_core::types::RemediationStatus;
use uuid::Uuid;

use crate::model::{FileResource, NewFileResource, UpdateRemediation, VersionFile};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for file resource and version membership operations.
pub trait FileResourceRepository {
    /// Finds a file by its unique identifier.
    fn find_file_by_id(
        &mut self,
        file_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<FileResource>>> + Send;

    /// Finds a file and locks its row until the transaction ends.
    fn lock_file_by_id(
        &mut self,
        file_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<FileResource>>> + Send;

    /// Finds the file whose current correlation id matches.
    fn find_file_by_correlation_id(
        &mut self,
        correlation_id: &str,
    ) -> impl Future<Output = PgResult<Option<FileResource>>> + Send;

    /// Finds the file whose current correlation id matches and locks its row.
    fn lock_file_by_correlation_id(
        &mut self,
        correlation_id: &str,
    ) -> impl Future<Output = PgResult<Option<FileResource>>> + Send;

    /// Lists the files attached to a version in display order.
    fn list_version_files(
        &mut self,
        version_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<FileResource>>> + Send;

    /// Lists the membership rows of a version in display order.
    fn list_version_memberships(
        &mut self,
        version_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<VersionFile>>> + Send;

    /// Writes the remediation columns of a file.
    fn update_file_remediation(
        &mut self,
        file_id: Uuid,
        status: &RemediationStatus,
    ) -> impl Future<Output = PgResult<FileResource>> + Send;

    /// Inserts a new file resource.
    fn create_file(
        &mut self,
        new_file: NewFileResource,
    ) -> impl Future<Output = PgResult<FileResource>> + Send;

    /// Attaches files to versions.
    fn attach_files(
        &mut self,
        memberships: Vec<VersionFile>,
    ) -> impl Future<Output = PgResult<()>> + Send;
}

impl FileResourceRepository for PgConnection {
    async fn find_file_by_id(&mut self, file_id: Uuid) -> PgResult<Option<FileResource>> {
        use schema::file_resources::{self, dsl};

        file_resources::table
            .filter(dsl::id.eq(file_id))
            .select(FileResource::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn lock_file_by_id(&mut self, file_id: Uuid) -> PgResult<Option<FileResource>> {
        use schema::file_resources::{self, dsl};

        file_resources::table
            .filter(dsl::id.eq(file_id))
            .select(FileResource::as_select())
            .for_update()
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_file_by_correlation_id(
        &mut self,
        correlation_id: &str,
    ) -> PgResult<Option<FileResource>> {
        use schema::file_resources::{self, dsl};

        file_resources::table
            .filter(dsl::correlation_id.eq(correlation_id))
            .select(FileResource::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn lock_file_by_correlation_id(
        &mut self,
        correlation_id: &str,
    ) -> PgResult<Option<FileResource>> {
        use schema::file_resources::{self, dsl};

        file_resources::table
            .filter(dsl::correlation_id.eq(correlation_id))
            .select(FileResource::as_select())
            .for_update()
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_version_files(&mut self, version_id: Uuid) -> PgResult<Vec<FileResource>> {
        use schema::{file_resources, version_files};

        version_files::table
            .inner_join(file_resources::table)
            .filter(version_files::version_id.eq(version_id))
            .order(version_files::position.asc())
            .select(FileResource::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_version_memberships(&mut self, version_id: Uuid) -> PgResult<Vec<VersionFile>> {
        use schema::version_files::{self, dsl};

        version_files::table
            .filter(dsl::version_id.eq(version_id))
            .order(dsl::position.asc())
            .select(VersionFile::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_file_remediation(
        &mut self,
        file_id: Uuid,
        status: &RemediationStatus,
    ) -> PgResult<FileResource> {
        use schema::file_resources::{self, dsl};

        let changes = UpdateRemediation::from(status);
        diesel::update(file_resources::table.filter(dsl::id.eq(file_id)))
            .set(&changes)
            .returning(FileResource::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn create_file(&mut self, new_file: NewFileResource) -> PgResult<FileResource> {
        use schema::file_resources;

        diesel::insert_into(file_resources::table)
            .values(&new_file)
            .returning(FileResource::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn attach_files(&mut self, memberships: Vec<VersionFile>) -> PgResult<()> {
        use schema::version_files;

        if memberships.is_empty() {
            return Ok(());
        }

        diesel::insert_into(version_files::table)
            .values(&memberships)
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }
}
