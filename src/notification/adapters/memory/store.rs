//! In-memory notification store for feed tests and local use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tokio::sync::broadcast;

use crate::account::domain::AccountId;
use crate::notification::{
    domain::{Notification, NotificationId, NotificationKind},
    ports::{NotificationEvent, NotificationStore, NotificationStoreError, NotificationStoreResult},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Thread-safe in-memory notification store.
#[derive(Clone)]
pub struct InMemoryNotificationStore {
    state: Arc<RwLock<NotificationState>>,
    events: broadcast::Sender<NotificationEvent>,
}

#[derive(Default)]
struct NotificationState {
    notifications: HashMap<NotificationId, Notification>,
}

impl Default for InMemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNotificationStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(NotificationState::default())),
            events,
        }
    }

    fn write_state(&self) -> NotificationStoreResult<RwLockWriteGuard<'_, NotificationState>> {
        self.state.write().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn publish(&self, event: NotificationEvent) {
        // Send fails only when no subscriber is listening.
        drop(self.events.send(event));
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, notification: &Notification) -> NotificationStoreResult<()> {
        let mut state = self.write_state()?;
        if state.notifications.contains_key(&notification.id()) {
            return Err(NotificationStoreError::DuplicateNotification(
                notification.id(),
            ));
        }
        state
            .notifications
            .insert(notification.id(), notification.clone());
        drop(state);
        self.publish(NotificationEvent::Stored(notification.clone()));
        Ok(())
    }

    async fn mark_read(&self, id: NotificationId) -> NotificationStoreResult<()> {
        let mut state = self.write_state()?;
        let Some(record) = state.notifications.get_mut(&id) else {
            return Ok(());
        };
        record.mark_read();
        let updated = record.clone();
        drop(state);
        self.publish(NotificationEvent::Updated(updated));
        Ok(())
    }

    async fn delete(&self, id: NotificationId) -> NotificationStoreResult<()> {
        let mut state = self.write_state()?;
        let removed = state.notifications.remove(&id);
        drop(state);
        if removed.is_some() {
            self.publish(NotificationEvent::Deleted(id));
        }
        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: AccountId,
    ) -> NotificationStoreResult<Vec<Notification>> {
        let state = self.state.read().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .notifications
            .values()
            .filter(|notification| notification.recipient_id() == recipient_id)
            .cloned()
            .collect())
    }

    async fn list_for_recipient_of_kinds(
        &self,
        recipient_id: AccountId,
        kinds: &[NotificationKind],
    ) -> NotificationStoreResult<Vec<Notification>> {
        let state = self.state.read().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .notifications
            .values()
            .filter(|notification| {
                notification.recipient_id() == recipient_id
                    && kinds.contains(&notification.kind())
            })
            .cloned()
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }
}
