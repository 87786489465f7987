use std::time::{Duration, Instant};

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use diesel_migrations::MigrationHarness;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Migrations applied at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Applied versions, oldest first. Empty when the schema was current.
    pub applied: Vec<String>,
    pub duration: Duration,
}

impl PgClient {
    /// Brings the schema up to date with the embedded migrations.
    ///
    /// The harness is synchronous, so it runs on the blocking pool over a
    /// connection opened outside the pool.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    pub async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        let started = Instant::now();
        let conn = AsyncPgConnection::establish(self.config().database_url()).await?;
        let mut harness: AsyncConnectionWrapper<AsyncPgConnection> = conn.into();

        let applied = tokio::task::spawn_blocking(move || {
            harness
                .run_pending_migrations(MIGRATIONS)
                .map(|versions| versions.iter().map(ToString::to_string).collect::<Vec<_>>())
        })
        .await
        .map_err(|join| PgError::Migration(join.into()))?
        .map_err(PgError::Migration)
        .inspect_err(|err| {
            tracing::error!(target: TRACING_TARGET_MIGRATION, error = %err, "Schema migration failed");
        })?;

        let duration = started.elapsed();
        for version in &applied {
            tracing::info!(target: TRACING_TARGET_MIGRATION, version, "Migration applied");
        }

        Ok(MigrationResult { applied, duration })
    }
}
