//! `PostgreSQL` task store implementation.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::account::domain::AccountId;
use crate::db::PgPool;
use crate::task::{
    domain::{
        PersistedTaskData, Task, TaskAuthorship, TaskId, TaskPriority, TaskStatus,
    },
    ports::{TaskEvent, TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// `PostgreSQL`-backed task store.
///
/// Change events reflect writes made through this process.
#[derive(Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
    events: broadcast::Sender<TaskEvent>,
}

impl PostgresTaskStore {
    /// Creates a new store from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { pool, events }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }

    fn publish(&self, event: TaskEvent) {
        // Send fails only when no subscriber is listening.
        drop(self.events.send(event));
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn insert(&self, task: &Task) -> TaskStoreResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            let id_taken: i64 = tasks::table
                .filter(tasks::id.eq(task_id.into_inner()))
                .count()
                .get_result(connection)
                .map_err(TaskStoreError::persistence)?;
            if id_taken > 0 {
                return Err(TaskStoreError::DuplicateTask(task_id));
            }

            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            Ok(())
        })
        .await?;

        self.publish(TaskEvent::Stored(task.clone()));
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskStoreResult<()> {
        let updated = task.clone();
        self.run_blocking(move |connection| {
            let written = persist_task(connection, &updated)?;
            if written == 0 {
                return Err(TaskStoreError::NotFound(updated.id()));
            }
            Ok(())
        })
        .await?;

        self.publish(TaskEvent::Updated(task.clone()));
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<Task> {
        let removed = self
            .run_blocking(move |connection| {
                connection.transaction::<_, TaskStoreError, _>(|tx| {
                    let row = tasks::table
                        .filter(tasks::id.eq(id.into_inner()))
                        .select(TaskRow::as_select())
                        .first::<TaskRow>(tx)
                        .optional()
                        .map_err(TaskStoreError::persistence)?
                        .ok_or(TaskStoreError::NotFound(id))?;

                    diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                        .execute(tx)
                        .map_err(TaskStoreError::persistence)?;
                    row_to_task(row)
                })
            })
            .await?;

        self.publish(TaskEvent::Deleted {
            id,
            owner_id: removed.owner_id(),
        });
        Ok(removed)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskStoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_by_owner(&self, owner_id: AccountId) -> TaskStoreResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner_id.into_inner()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn delete_exchanged_between(
        &self,
        first: AccountId,
        second: AccountId,
    ) -> TaskStoreResult<Vec<Task>> {
        let removed = self
            .run_blocking(move |connection| {
                connection.transaction::<_, TaskStoreError, _>(|tx| {
                    let exchanged = tasks::owner_id
                        .eq(first.into_inner())
                        .and(tasks::creator_id.eq(second.into_inner()))
                        .or(tasks::owner_id
                            .eq(second.into_inner())
                            .and(tasks::creator_id.eq(first.into_inner())));

                    let rows = tasks::table
                        .filter(exchanged)
                        .select(TaskRow::as_select())
                        .load::<TaskRow>(tx)
                        .map_err(TaskStoreError::persistence)?;

                    let doomed: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
                    diesel::delete(tasks::table.filter(tasks::id.eq_any(doomed)))
                        .execute(tx)
                        .map_err(TaskStoreError::persistence)?;

                    rows.into_iter().map(row_to_task).collect::<TaskStoreResult<Vec<Task>>>()
                })
            })
            .await?;

        for task in &removed {
            self.publish(TaskEvent::Deleted {
                id: task.id(),
                owner_id: task.owner_id(),
            });
        }
        Ok(removed)
    }

    fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }
}

fn persist_task(connection: &mut PgConnection, task: &Task) -> TaskStoreResult<usize> {
    diesel::update(tasks::table.filter(tasks::id.eq(task.id().into_inner())))
        .set((
            tasks::title.eq(task.title().to_owned()),
            tasks::description.eq(task.description().to_owned()),
            tasks::due_date.eq(task.due_date()),
            tasks::priority.eq(task.priority().as_str().to_owned()),
            tasks::status.eq(task.status().as_str().to_owned()),
            tasks::declined.eq(task.is_declined()),
            tasks::decline_message.eq(task.decline_message().map(str::to_owned)),
            tasks::edited.eq(task.is_edited()),
            tasks::updated_at.eq(task.updated_at()),
        ))
        .execute(connection)
        .map_err(TaskStoreError::persistence)
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner_id().into_inner(),
        creator_id: task.creator_id().map(AccountId::into_inner),
        authorship: task.authorship().as_str().to_owned(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        due_date: task.due_date(),
        priority: task.priority().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        declined: task.is_declined(),
        decline_message: task.decline_message().map(str::to_owned),
        edited: task.is_edited(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let TaskRow {
        id,
        owner_id,
        creator_id,
        authorship: persisted_authorship,
        title,
        description,
        due_date,
        priority: persisted_priority,
        status: persisted_status,
        declined,
        decline_message,
        edited,
        created_at,
        updated_at,
    } = row;

    let authorship = TaskAuthorship::try_from(persisted_authorship.as_str())
        .map_err(TaskStoreError::persistence)?;
    let priority =
        TaskPriority::try_from(persisted_priority.as_str()).map_err(TaskStoreError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskStoreError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner_id: AccountId::from_uuid(owner_id),
        creator_id: creator_id.map(AccountId::from_uuid),
        authorship,
        title,
        description,
        due_date,
        priority,
        status,
        declined,
        decline_message,
        edited,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
