#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./migrations");

/// Tracing target for statements issued by the document store.
pub const TRACING_TARGET_QUERY: &str = "remedy_postgres::queries";

/// Tracing target for schema migrations.
pub const TRACING_TARGET_MIGRATION: &str = "remedy_postgres::migrations";

/// Tracing target for pool and connection events.
pub const TRACING_TARGET_CONNECTION: &str = "remedy_postgres::connection";

mod client;
pub mod model;
pub mod query;
mod schema;
mod store;
pub mod types;

use std::borrow::Cow;

use deadpool::managed::TimeoutType;
use diesel::ConnectionError;
use diesel::result::Error;
pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{
    ConnectionPool, MigrationResult, PgClient, PgConfig, PgConn, PooledConnection,
};

/// Errors of the pool and driver wrapped by [`PgError`].
pub mod error {
    pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

    pub use deadpool::managed::TimeoutType;
    pub use diesel::result::{ConnectionError as DieselConnectionError, Error as DieselError};
    pub use diesel_async::pooled_connection::PoolError as DieselPoolError;
    pub use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;
}

/// Failure of a pool, migration or store operation.
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled appropriately"]
pub enum PgError {
    #[error("Invalid database settings: {0}")]
    Config(String),

    /// Creating, waiting for or recycling a pooled connection took too long.
    #[error("Database operation timed out")]
    Timeout(TimeoutType),

    #[error("Database connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Database migration error: {0}")]
    Migration(error::BoxError),

    #[error("Database query error: {0}")]
    Query(#[from] Error),

    /// Also raised for rows that break the remediation state rules.
    #[error("Unexpected error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl PgError {
    /// Returns whether retrying the task that hit this error may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PgError::Timeout(_)
                | PgError::Connection(ConnectionError::BadConnection(_))
                | PgError::Query(Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::SerializationFailure,
                    _
                ))
        )
    }
}

impl From<error::DeadpoolError> for PgError {
    fn from(value: error::DeadpoolError) -> Self {
        use error::{DeadpoolError, DieselPoolError};

        match value {
            DeadpoolError::Timeout(timeout) => Self::Timeout(timeout),
            DeadpoolError::Backend(DieselPoolError::QueryError(error)) => Self::Query(error),
            DeadpoolError::Backend(DieselPoolError::ConnectionError(error)) => {
                Self::Connection(error)
            }
            DeadpoolError::PostCreateHook(err) => {
                tracing::warn!(target: TRACING_TARGET_CONNECTION, "Unexpected post-create hook error: {}", err);
                Self::Unexpected(err.to_string().into())
            }
            DeadpoolError::NoRuntimeSpecified => Self::Unexpected("No runtime specified".into()),
            DeadpoolError::Closed => Self::Connection(ConnectionError::InvalidConnectionUrl(
                "Connection pool is closed".into(),
            )),
        }
    }
}

impl From<PgError> for remedy_core::Error {
    fn from(error: PgError) -> Self {
        let kind = match &error {
            PgError::Config(_) => remedy_core::ErrorKind::Configuration,
            PgError::Timeout(_) => remedy_core::ErrorKind::Timeout,
            PgError::Connection(_) => remedy_core::ErrorKind::ServiceUnavailable,
            PgError::Query(Error::NotFound) => remedy_core::ErrorKind::NotFound,
            _ if error.is_transient() => remedy_core::ErrorKind::ServiceUnavailable,
            _ => remedy_core::ErrorKind::InternalError,
        };

        remedy_core::Error::new(kind)
            .with_message("database operation failed")
            .with_source(error)
    }
}

pub type PgResult<T, E = PgError> = Result<T, E>;
