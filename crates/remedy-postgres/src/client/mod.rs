//! Pool, configuration and migrations.

mod custom_hooks;
mod migrate;
mod pg_client;
mod pg_config;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
pub use migrate::MigrationResult;
pub use pg_client::{PgClient, PgConn};
pub use pg_config::PgConfig;

type Manager = AsyncDieselConnectionManager<AsyncPgConnection>;

pub type ConnectionPool = Pool<Manager>;

pub type PooledConnection = Object<Manager>;
