//! Store port for task persistence, lookup, and change events.

use crate::account::domain::AccountId;
use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Change event published by a task store after a successful write.
///
/// Deletion carries the owner so board views can dismiss the record
/// without another lookup.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// A task was created.
    Stored(Task),
    /// A task was mutated.
    Updated(Task),
    /// A task was removed.
    Deleted {
        /// Identifier of the removed task.
        id: TaskId,
        /// Board the task was removed from.
        owner_id: AccountId,
    },
}

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the task id already
    /// exists.
    async fn insert(&self, task: &Task) -> TaskStoreResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskStoreResult<()>;

    /// Removes a task and returns the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskStoreResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Returns every task on the given owner's board, declined ones
    /// included, in unspecified order.
    async fn list_by_owner(&self, owner_id: AccountId) -> TaskStoreResult<Vec<Task>>;

    /// Removes the tasks the two accounts created for each other.
    ///
    /// A task qualifies when it sits on one account's board and carries the
    /// other account as creator. Returns the removed records so callers can
    /// fan out per-task notifications.
    async fn delete_exchanged_between(
        &self,
        first: AccountId,
        second: AccountId,
    ) -> TaskStoreResult<Vec<Task>>;

    /// Subscribes to task change events.
    ///
    /// Dropping the receiver ends the subscription.
    fn subscribe(&self) -> broadcast::Receiver<TaskEvent>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for TaskStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
