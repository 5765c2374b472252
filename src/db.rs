//! PostgreSQL connection pooling shared by the store adapters.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::env;
use thiserror::Error;

/// Connection pool type used by all PostgreSQL adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Environment variable holding the PostgreSQL connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Errors returned while building a pool from the environment.
#[derive(Debug, Clone, Error)]
pub enum PoolConfigError {
    /// The connection string variable is missing or unreadable.
    #[error("{DATABASE_URL_VAR} is not set")]
    MissingDatabaseUrl,

    /// The pool could not be built against the configured database.
    #[error("failed to build connection pool: {0}")]
    Build(String),
}

/// Builds a connection pool from `DATABASE_URL`.
///
/// # Errors
///
/// Returns [`PoolConfigError::MissingDatabaseUrl`] when the variable is
/// absent, or [`PoolConfigError::Build`] when the pool cannot reach the
/// database.
pub fn pool_from_env() -> Result<PgPool, PoolConfigError> {
    let url = env::var(DATABASE_URL_VAR).map_err(|_| PoolConfigError::MissingDatabaseUrl)?;
    Pool::builder()
        .build(ConnectionManager::new(url))
        .map_err(|err| PoolConfigError::Build(err.to_string()))
}
