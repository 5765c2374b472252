//! `PostgreSQL` adapter implementations for the task module.

mod models;
mod repository;
mod schema;

pub use repository::PostgresTaskStore;
