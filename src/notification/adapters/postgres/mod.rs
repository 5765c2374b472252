//! `PostgreSQL` adapter implementations for the notification module.

mod models;
mod repository;
mod schema;

pub use repository::PostgresNotificationStore;
