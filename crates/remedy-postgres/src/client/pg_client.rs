use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool::managed::{Hook, Pool};
use derive_more::{Deref, DerefMut};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::AsyncConnection;

use super::custom_hooks;
use crate::{
    ConnectionPool, PgConfig, PgConnection, PgError, PgResult, PooledConnection,
    TRACING_TARGET_CONNECTION,
};

/// Acquisitions slower than this are reported as pool pressure.
const SLOW_ACQUIRE: Duration = Duration::from_millis(100);

/// Handle to the orchestrator's connection pool.
///
/// Clones share one pool. Connections are opened lazily.
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<Inner>,
}

struct Inner {
    pool: ConnectionPool,
    config: PgConfig,
}

impl PgClient {
    /// Builds the pool without opening a connection.
    ///
    /// Prefer [`PgConfig::build`], which validates the settings first.
    #[tracing::instrument(
        skip(config),
        target = TRACING_TARGET_CONNECTION,
        fields(postgres_url = %config.database_url_masked())
    )]
    pub fn new(config: PgConfig) -> PgResult<Self> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(custom_hooks::establish_logged);
        let manager =
            AsyncDieselConnectionManager::new_with_config(config.database_url(), manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.postgres_max_connections as usize)
            .runtime(deadpool::Runtime::Tokio1)
            .wait_timeout(config.connection_timeout())
            .create_timeout(config.connection_timeout())
            .recycle_timeout(config.idle_timeout())
            .post_recycle(Hook::sync_fn(custom_hooks::report_broken))
            .build()
            .map_err(|e| PgError::Unexpected(format!("connection pool: {e}").into()))?;

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            max_connections = config.postgres_max_connections,
            "Connection pool created"
        );

        Ok(Self {
            inner: Arc::new(Inner { pool, config }),
        })
    }

    /// Takes a connection from the pool, waiting at most the configured
    /// connection timeout.
    pub async fn get_connection(&self) -> PgResult<PgConn> {
        let started = Instant::now();
        let conn = self.inner.pool.get().await.inspect_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                error = %e,
                "No database connection available"
            );
        })?;

        let waited = started.elapsed();
        if waited > SLOW_ACQUIRE {
            let status = self.inner.pool.status();
            tracing::warn!(
                target: TRACING_TARGET_CONNECTION,
                waited_ms = waited.as_millis(),
                waiting = status.waiting,
                "Connection pool is saturated"
            );
        }

        Ok(PgConn { conn })
    }

    #[inline]
    pub fn config(&self) -> &PgConfig {
        &self.inner.config
    }
}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.inner.pool.status();
        f.debug_struct("PgClient")
            .field("postgres_url", &self.inner.config.database_url_masked())
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

/// A connection borrowed from the pool.
///
/// Dereferences to [`PgConnection`], so every repository in [`crate::query`]
/// is callable on it. Dropping it hands the connection back.
#[derive(Deref, DerefMut)]
pub struct PgConn {
    #[deref]
    #[deref_mut]
    conn: PooledConnection,
}

impl PgConn {
    /// Runs `f` in a transaction that commits only when it returns `Ok`.
    pub async fn transaction<'a, T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: for<'r> FnOnce(&'r mut PgConnection) -> ScopedBoxFuture<'a, 'r, Result<T, E>>
            + Send
            + 'a,
        T: Send + 'a,
        E: From<diesel::result::Error> + Send + 'a,
    {
        let conn: &mut PgConnection = &mut self.conn;
        conn.transaction(f).await
    }
}

impl fmt::Debug for PgConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConn").finish_non_exhaustive()
    }
}
