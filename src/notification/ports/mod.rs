//! Port contracts for the notification module.

pub mod store;

pub use store::{
    NotificationEvent, NotificationStore, NotificationStoreError, NotificationStoreResult,
};
