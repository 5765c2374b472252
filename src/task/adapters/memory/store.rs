//! In-memory task store for lifecycle tests and local use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tokio::sync::broadcast;

use crate::account::domain::AccountId;
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskEvent, TaskStore, TaskStoreError, TaskStoreResult},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Thread-safe in-memory task store.
#[derive(Clone)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<TaskState>>,
    events: broadcast::Sender<TaskEvent>,
}

#[derive(Default)]
struct TaskState {
    tasks: HashMap<TaskId, Task>,
    owner_index: HashMap<AccountId, Vec<TaskId>>,
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(TaskState::default())),
            events,
        }
    }

    fn write_state(&self) -> TaskStoreResult<RwLockWriteGuard<'_, TaskState>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn publish(&self, event: TaskEvent) {
        // Send fails only when no subscriber is listening.
        drop(self.events.send(event));
    }
}

fn remove_from_owner_index(state: &mut TaskState, owner_id: AccountId, task_id: TaskId) {
    if let Some(ids) = state.owner_index.get_mut(&owner_id) {
        ids.retain(|id| *id != task_id);
        if ids.is_empty() {
            state.owner_index.remove(&owner_id);
        }
    }
}

fn remove_task(state: &mut TaskState, id: TaskId) -> Option<Task> {
    let task = state.tasks.remove(&id)?;
    remove_from_owner_index(state, task.owner_id(), id);
    Some(task)
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        state
            .owner_index
            .entry(task.owner_id())
            .or_default()
            .push(task.id());
        state.tasks.insert(task.id(), task.clone());
        drop(state);
        self.publish(TaskEvent::Stored(task.clone()));
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self.write_state()?;
        if !state.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::NotFound(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        drop(state);
        self.publish(TaskEvent::Updated(task.clone()));
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<Task> {
        let mut state = self.write_state()?;
        let removed = remove_task(&mut state, id).ok_or(TaskStoreError::NotFound(id))?;
        drop(state);
        self.publish(TaskEvent::Deleted {
            id,
            owner_id: removed.owner_id(),
        });
        Ok(removed)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: AccountId) -> TaskStoreResult<Vec<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))?;
        let tasks = state
            .owner_index
            .get(&owner_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(tasks)
    }

    async fn delete_exchanged_between(
        &self,
        first: AccountId,
        second: AccountId,
    ) -> TaskStoreResult<Vec<Task>> {
        let mut state = self.write_state()?;
        let doomed: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|task| {
                (task.owner_id() == first && task.creator_id() == Some(second))
                    || (task.owner_id() == second && task.creator_id() == Some(first))
            })
            .map(Task::id)
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for id in doomed {
            if let Some(task) = remove_task(&mut state, id) {
                removed.push(task);
            }
        }
        drop(state);
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
