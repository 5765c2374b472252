//! `PostgreSQL` adapter implementations for the account module.

mod models;
mod repository;
mod schema;

pub use repository::PostgresDirectory;
