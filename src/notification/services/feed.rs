//! Merged notification feed and its subscription-reconciled projection.

use crate::account::domain::AccountId;
use crate::notification::{
    domain::{Notification, NotificationId, NotificationKind},
    ports::{NotificationEvent, NotificationStore, NotificationStoreError},
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Service-level errors for feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] NotificationStoreError),
}

/// Result type for feed service operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Read path over the notification store.
///
/// The feed merges three independent queries: the recipient's invitation
/// and task-deleted notifications, the partner's task notifications, and
/// the recipient's general feed. Overlapping rows are deduplicated by id
/// and the merge is ordered newest first.
#[derive(Clone)]
pub struct NotificationFeedService<N>
where
    N: NotificationStore,
{
    store: Arc<N>,
}

impl<N> NotificationFeedService<N>
where
    N: NotificationStore,
{
    /// Creates a new feed service.
    #[must_use]
    pub const fn new(store: Arc<N>) -> Self {
        Self { store }
    }

    /// Returns the merged feed for the given recipient, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Store`] when any of the underlying queries
    /// fails.
    pub async fn feed(
        &self,
        recipient_id: AccountId,
        partner_id: Option<AccountId>,
    ) -> FeedResult<Vec<Notification>> {
        let mut merged = self
            .store
            .list_for_recipient_of_kinds(
                recipient_id,
                &[NotificationKind::Invitation, NotificationKind::TaskDeleted],
            )
            .await?;
        if let Some(partner) = partner_id {
            merged.extend(
                self.store
                    .list_for_recipient_of_kinds(partner, &[NotificationKind::Task])
                    .await?,
            );
        }
        merged.extend(self.store.list_for_recipient(recipient_id).await?);

        let mut seen = HashSet::new();
        merged.retain(|notification| seen.insert(notification.id()));
        merged.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(merged)
    }

    /// Marks a notification as read. Missing records are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Store`] when the write fails.
    pub async fn mark_read(&self, id: NotificationId) -> FeedResult<()> {
        Ok(self.store.mark_read(id).await?)
    }

    /// Deletes a notification. Missing records are ignored.
    ///
    /// There is no optimistic local removal here: callers hold a
    /// [`FeedProjection`] fed by [`Self::subscribe`], and the deletion event
    /// (or its absence, on failure) reconciles the visible list.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Store`] when the write fails.
    pub async fn delete(&self, id: NotificationId) -> FeedResult<()> {
        Ok(self.store.delete(id).await?)
    }

    /// Subscribes to the store's change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.store.subscribe()
    }
}

/// A recipient's live view of the feed, folded from store change events.
///
/// The projection is pure state: seed it from [`NotificationFeedService::feed`]
/// and apply every event from [`NotificationFeedService::subscribe`]. It never
/// guesses ahead of the store, so a failed mutation needs no rollback.
#[derive(Debug, Clone)]
pub struct FeedProjection {
    recipient_id: AccountId,
    entries: Vec<Notification>,
}

impl FeedProjection {
    /// Creates an empty projection for the given recipient.
    #[must_use]
    pub const fn new(recipient_id: AccountId) -> Self {
        Self {
            recipient_id,
            entries: Vec::new(),
        }
    }

    /// Creates a projection seeded from an initial feed query.
    ///
    /// Entries addressed to other recipients are dropped; the rest are
    /// ordered newest first.
    #[must_use]
    pub fn seeded(recipient_id: AccountId, entries: Vec<Notification>) -> Self {
        let mut projection = Self {
            recipient_id,
            entries,
        };
        projection
            .entries
            .retain(|notification| notification.recipient_id() == recipient_id);
        projection.sort();
        projection
    }

    /// Folds one store event into the projection.
    pub fn apply(&mut self, event: &NotificationEvent) {
        match event {
            NotificationEvent::Stored(notification) => {
                if notification.recipient_id() == self.recipient_id
                    && !self.contains(notification.id())
                {
                    self.entries.push(notification.clone());
                    self.sort();
                }
            }
            NotificationEvent::Updated(notification) => {
                if notification.recipient_id() == self.recipient_id {
                    for entry in &mut self.entries {
                        if entry.id() == notification.id() {
                            *entry = notification.clone();
                        }
                    }
                }
            }
            NotificationEvent::Deleted(id) => {
                self.entries.retain(|entry| entry.id() != *id);
            }
        }
    }

    /// Returns the projected entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Returns the number of projected entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the projection holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn contains(&self, id: NotificationId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    }
}
