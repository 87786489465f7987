//! Connection setup and recycle hooks of the pool.

use std::time::Instant;

use deadpool::managed::{HookResult, Metrics};
use diesel::ConnectionResult;
use diesel_async::pooled_connection::{PoolError, PoolableConnection};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures::FutureExt;
use futures::future::BoxFuture;

use super::PgConfig;
use crate::TRACING_TARGET_CONNECTION;

/// Opens a connection and records how long the handshake took.
pub fn establish_logged<C>(url: &str) -> BoxFuture<'_, ConnectionResult<C>>
where
    C: AsyncConnection + 'static,
{
    async move {
        let started = Instant::now();
        let connection = C::establish(url).await;
        let elapsed_ms = started.elapsed().as_millis();

        if let Err(err) = &connection {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                postgres_url = %PgConfig::mask_url(url),
                elapsed_ms,
                error = %err,
                "Could not open database connection"
            );
        } else {
            tracing::debug!(target: TRACING_TARGET_CONNECTION, elapsed_ms, "Database connection opened");
        }

        connection
    }
    .boxed()
}

/// Logs connections that come back from recycling in a broken state.
pub fn report_broken(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    if conn.is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_CONNECTION,
            recycle_count = metrics.recycle_count,
            "Recycled database connection is broken"
        );
    }
    Ok(())
}
