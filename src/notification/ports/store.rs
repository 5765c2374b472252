//! Store port for notification persistence and change events.

use crate::account::domain::AccountId;
use crate::notification::domain::{Notification, NotificationId, NotificationKind};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Result type for notification store operations.
pub type NotificationStoreResult<T> = Result<T, NotificationStoreError>;

/// Change event published by a notification store after a successful write.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// A notification was created.
    Stored(Notification),
    /// A notification was mutated (read flag).
    Updated(Notification),
    /// A notification was removed.
    Deleted(NotificationId),
}

/// Notification persistence contract.
///
/// `mark_read` and `delete` are idempotent: a missing record is a no-op,
/// not an error, because the feed's read side may race the backing store.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Stores a new notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::DuplicateNotification`] when the id
    /// already exists.
    async fn insert(&self, notification: &Notification) -> NotificationStoreResult<()>;

    /// Sets the read flag on a notification. Missing records are ignored.
    async fn mark_read(&self, id: NotificationId) -> NotificationStoreResult<()>;

    /// Removes a notification. Missing records are ignored.
    async fn delete(&self, id: NotificationId) -> NotificationStoreResult<()>;

    /// Returns every notification addressed to the recipient, in
    /// unspecified order.
    async fn list_for_recipient(
        &self,
        recipient_id: AccountId,
    ) -> NotificationStoreResult<Vec<Notification>>;

    /// Returns the recipient's notifications of the given kinds, in
    /// unspecified order.
    async fn list_for_recipient_of_kinds(
        &self,
        recipient_id: AccountId,
        kinds: &[NotificationKind],
    ) -> NotificationStoreResult<Vec<Notification>>;

    /// Subscribes to notification change events.
    ///
    /// Dropping the receiver ends the subscription.
    fn subscribe(&self) -> broadcast::Receiver<NotificationEvent>;
}

/// Errors returned by notification store implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationStoreError {
    /// A notification with the same identifier already exists.
    #[error("duplicate notification identifier: {0}")]
    DuplicateNotification(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for NotificationStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
