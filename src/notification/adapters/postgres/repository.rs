//! `PostgreSQL` notification store implementation.

use super::{
    models::{NewNotificationRow, NotificationRow},
    schema::notifications,
};
use crate::account::domain::AccountId;
use crate::db::PgPool;
use crate::notification::{
    domain::{Notification, NotificationId, NotificationKind, PersistedNotificationData},
    ports::{NotificationEvent, NotificationStore, NotificationStoreError, NotificationStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// `PostgreSQL`-backed notification store.
///
/// Change events reflect writes made through this process.
#[derive(Clone)]
pub struct PostgresNotificationStore {
    pool: PgPool,
    events: broadcast::Sender<NotificationEvent>,
}

impl PostgresNotificationStore {
    /// Creates a new store from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { pool, events }
    }

    async fn run_blocking<F, T>(&self, f: F) -> NotificationStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> NotificationStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(NotificationStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(NotificationStoreError::persistence)?
    }

    fn publish(&self, event: NotificationEvent) {
        // Send fails only when no subscriber is listening.
        drop(self.events.send(event));
    }
}

#[async_trait]
impl NotificationStore for PostgresNotificationStore {
    async fn insert(&self, notification: &Notification) -> NotificationStoreResult<()> {
        let notification_id = notification.id();
        let new_row = to_new_row(notification);

        self.run_blocking(move |connection| {
            let id_taken: i64 = notifications::table
                .filter(notifications::id.eq(notification_id.into_inner()))
                .count()
                .get_result(connection)
                .map_err(NotificationStoreError::persistence)?;
            if id_taken > 0 {
                return Err(NotificationStoreError::DuplicateNotification(
                    notification_id,
                ));
            }

            diesel::insert_into(notifications::table)
                .values(&new_row)
                .execute(connection)
                .map_err(NotificationStoreError::persistence)?;
            Ok(())
        })
        .await?;

        self.publish(NotificationEvent::Stored(notification.clone()));
        Ok(())
    }

    async fn mark_read(&self, id: NotificationId) -> NotificationStoreResult<()> {
        let updated = self
            .run_blocking(move |connection| {
                connection.transaction::<_, NotificationStoreError, _>(|tx| {
                    let row = notifications::table
                        .filter(notifications::id.eq(id.into_inner()))
                        .select(NotificationRow::as_select())
                        .first::<NotificationRow>(tx)
                        .optional()
                        .map_err(NotificationStoreError::persistence)?;
                    let Some(mut row) = row else {
                        return Ok(None);
                    };

                    diesel::update(
                        notifications::table.filter(notifications::id.eq(id.into_inner())),
                    )
                    .set(notifications::read.eq(true))
                    .execute(tx)
                    .map_err(NotificationStoreError::persistence)?;

                    row.read = true;
                    row_to_notification(row).map(Some)
                })
            })
            .await?;

        if let Some(notification) = updated {
            self.publish(NotificationEvent::Updated(notification));
        }
        Ok(())
    }

    async fn delete(&self, id: NotificationId) -> NotificationStoreResult<()> {
        let removed = self
            .run_blocking(move |connection| {
                diesel::delete(notifications::table.filter(notifications::id.eq(id.into_inner())))
                    .execute(connection)
                    .map_err(NotificationStoreError::persistence)
            })
            .await?;

        if removed > 0 {
            self.publish(NotificationEvent::Deleted(id));
        }
        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: AccountId,
    ) -> NotificationStoreResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            let rows = notifications::table
                .filter(notifications::recipient_id.eq(recipient_id.into_inner()))
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationStoreError::persistence)?;
            rows.into_iter().map(row_to_notification).collect()
        })
        .await
    }

    async fn list_for_recipient_of_kinds(
        &self,
        recipient_id: AccountId,
        kinds: &[NotificationKind],
    ) -> NotificationStoreResult<Vec<Notification>> {
        let kind_names: Vec<String> = kinds
            .iter()
            .map(|kind| kind.as_str().to_owned())
            .collect();
        self.run_blocking(move |connection| {
            let rows = notifications::table
                .filter(notifications::recipient_id.eq(recipient_id.into_inner()))
                .filter(notifications::kind.eq_any(kind_names))
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationStoreError::persistence)?;
            rows.into_iter().map(row_to_notification).collect()
        })
        .await
    }

    fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }
}

fn to_new_row(notification: &Notification) -> NewNotificationRow {
    NewNotificationRow {
        id: notification.id().into_inner(),
        recipient_id: notification.recipient_id().into_inner(),
        kind: notification.kind().as_str().to_owned(),
        message: notification.message().to_owned(),
        related_id: notification.related_id(),
        task_title: notification.task_title().map(str::to_owned),
        created_at: notification.created_at(),
        read: notification.is_read(),
    }
}

fn row_to_notification(row: NotificationRow) -> NotificationStoreResult<Notification> {
    let NotificationRow {
        id,
        recipient_id,
        kind: persisted_kind,
        message,
        related_id,
        task_title,
        created_at,
        read,
    } = row;

    let kind = NotificationKind::try_from(persisted_kind.as_str())
        .map_err(NotificationStoreError::persistence)?;

    let data = PersistedNotificationData {
        id: NotificationId::from_uuid(id),
        recipient_id: AccountId::from_uuid(recipient_id),
        kind,
        message,
        related_id,
        task_title,
        created_at,
        read,
    };
    Ok(Notification::from_persisted(data))
}
