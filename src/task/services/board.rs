//! Service layer for task creation, lifecycle transitions, and board views.

use crate::account::{
    domain::{Account, AccountId},
    ports::{Directory, DirectoryError},
};
use crate::notification::{
    domain::{Notification, NotificationDomainError, NotificationKind},
    ports::{NotificationStore, NotificationStoreError},
    services::compose,
};
use crate::session::Session;
use crate::task::{
    domain::{DueState, Task, TaskAuthorship, TaskDomainError, TaskDraft, TaskId, TaskPriority,
        TaskStatus},
    ports::{TaskStore, TaskStoreError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Whose board a new task goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAssignee {
    /// The session account's own board.
    Own,
    /// The linked partner's board.
    Partner,
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    due_date: Option<DateTime<Utc>>,
    priority: TaskPriority,
    assignee: TaskAssignee,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, assignee: TaskAssignee) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            due_date: None,
            priority: TaskPriority::Medium,
            assignee,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// A board's tasks grouped by status, declined tasks excluded.
///
/// Each column is ordered oldest first. The approval column exists for the
/// declared-but-unreachable status and stays empty until an approval step
/// is wired up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    /// Tasks not yet started.
    pub to_do: Vec<Task>,
    /// Tasks being worked on.
    pub in_progress: Vec<Task>,
    /// Finished tasks.
    pub done: Vec<Task>,
    /// Tasks awaiting approval.
    pub pending_approval: Vec<Task>,
}

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum TaskBoardError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The account does not exist.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// Assigning to the partner requires a linked partner.
    #[error("no partner is linked to this account")]
    NoPartnerLinked,

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(DirectoryError),

    /// Notification store operation failed during fan-out.
    #[error(transparent)]
    Notifications(#[from] NotificationStoreError),

    /// Notification message composition failed.
    #[error(transparent)]
    Message(#[from] NotificationDomainError),
}

/// Result type for board service operations.
pub type TaskBoardResult<T> = Result<T, TaskBoardError>;

fn board_error(err: DirectoryError) -> TaskBoardError {
    match err {
        DirectoryError::NotFound(id) => TaskBoardError::AccountNotFound(id),
        other => TaskBoardError::Directory(other),
    }
}

/// Task board orchestration service.
#[derive(Clone)]
pub struct TaskBoardService<D, T, N, C>
where
    D: Directory,
    T: TaskStore,
    N: NotificationStore,
    C: Clock + Send + Sync,
{
    directory: Arc<D>,
    store: Arc<T>,
    notifications: Arc<N>,
    clock: Arc<C>,
}

impl<D, T, N, C> TaskBoardService<D, T, N, C>
where
    D: Directory,
    T: TaskStore,
    N: NotificationStore,
    C: Clock + Send + Sync,
{
    /// Creates a new board service.
    #[must_use]
    pub const fn new(
        directory: Arc<D>,
        store: Arc<T>,
        notifications: Arc<N>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            directory,
            store,
            notifications,
            clock,
        }
    }

    /// Creates a task on the session account's or the partner's board.
    ///
    /// The task starts in To Do. Nothing is persisted when validation
    /// fails. Creation itself emits no notification.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] or
    /// [`TaskDomainError::MissingDueDate`] (via [`TaskBoardError::Domain`])
    /// for bad input, and [`TaskBoardError::NoPartnerLinked`] when the
    /// request assigns to a partner that is not there.
    pub async fn create_task(
        &self,
        session: &Session,
        request: CreateTaskRequest,
    ) -> TaskBoardResult<Task> {
        if request.title.trim().is_empty() {
            return Err(TaskDomainError::EmptyTitle.into());
        }
        let due_date = request.due_date.ok_or(TaskDomainError::MissingDueDate)?;

        let (owner_id, authorship) = match request.assignee {
            TaskAssignee::Own => (session.account_id(), TaskAuthorship::SelfAuthored),
            TaskAssignee::Partner => {
                let me = self.require_account(session.account_id()).await?;
                let partner_id = me.partner_id().ok_or(TaskBoardError::NoPartnerLinked)?;
                (partner_id, TaskAuthorship::PartnerAssigned)
            }
        };

        let draft = TaskDraft {
            title: request.title,
            description: request.description,
            due_date,
            priority: request.priority,
        };
        let task = Task::new(
            owner_id,
            Some(session.account_id()),
            authorship,
            draft,
            &*self.clock,
        )?;
        self.store.insert(&task).await?;
        debug!(task = %task.id(), owner = %owner_id, "task created");
        Ok(task)
    }

    /// Moves a task to a new lifecycle status.
    ///
    /// The Done -> To Do restart must carry `new_due_date`; every other
    /// transition ignores it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::TaskNotFound`] when the task is missing,
    /// or the domain error when the state machine rejects the change.
    pub async fn change_status(
        &self,
        task_id: TaskId,
        new_status: TaskStatus,
        new_due_date: Option<DateTime<Utc>>,
    ) -> TaskBoardResult<Task> {
        let mut task = self.require_task(task_id).await?;
        task.transition_to(new_status, new_due_date, &*self.clock)?;
        self.store.update(&task).await?;
        Ok(task)
    }

    /// Declines a task on the session account's board.
    ///
    /// The task keeps its status but leaves the active board views; the
    /// creator is notified with the reason.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::TaskNotFound`] when the task is missing,
    /// or the domain error when the reason is blank, the task is done, or
    /// the flag is already set.
    pub async fn decline_task(
        &self,
        session: &Session,
        task_id: TaskId,
        reason: &str,
    ) -> TaskBoardResult<Task> {
        let mut task = self.require_task(task_id).await?;
        task.decline(reason, &*self.clock)?;
        self.store.update(&task).await?;

        if let Some(creator_id) = task.creator_id() {
            if creator_id != session.account_id() {
                let me = self.require_account(session.account_id()).await?;
                let message = compose::task_declined(&me, task.title(), reason)?;
                let notification =
                    Notification::new(creator_id, NotificationKind::Task, message, &*self.clock)?
                        .with_related_id(task.id().into_inner())
                        .with_task_title(task.title());
                self.notifications.insert(&notification).await?;
            }
        }
        Ok(task)
    }

    /// Clears a task's declined flag and restores it to To Do.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::TaskNotFound`] when the task is missing,
    /// or the domain error when the task is not declined.
    pub async fn reactivate_task(&self, task_id: TaskId) -> TaskBoardResult<Task> {
        let mut task = self.require_task(task_id).await?;
        task.reactivate(&*self.clock)?;
        self.store.update(&task).await?;
        Ok(task)
    }

    /// Overwrites a task's content fields and marks it edited.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::TaskNotFound`] when the task is missing,
    /// or the domain error when the new title is blank.
    pub async fn edit_task(
        &self,
        task_id: TaskId,
        title: impl Into<String> + Send,
        description: impl Into<String> + Send,
        due_date: DateTime<Utc>,
    ) -> TaskBoardResult<Task> {
        let mut task = self.require_task(task_id).await?;
        task.edit(title, description, due_date, &*self.clock)?;
        self.store.update(&task).await?;
        Ok(task)
    }

    /// Removes a task outright and returns the removed record.
    ///
    /// The store publishes the deletion, so any open view of the task
    /// dismisses itself through its subscription.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::TaskNotFound`] when the task is missing.
    pub async fn delete_task(&self, task_id: TaskId) -> TaskBoardResult<Task> {
        match self.store.delete(task_id).await {
            Ok(task) => Ok(task),
            Err(TaskStoreError::NotFound(id)) => Err(TaskBoardError::TaskNotFound(id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Returns the given board grouped by status, declined tasks excluded,
    /// each column oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Store`] when the listing fails.
    pub async fn board(&self, owner_id: AccountId) -> TaskBoardResult<BoardView> {
        let mut tasks = self.store.list_by_owner(owner_id).await?;
        tasks.retain(|task| !task.is_declined());
        tasks.sort_by_key(Task::created_at);

        let mut view = BoardView::default();
        for task in tasks {
            match task.status() {
                TaskStatus::ToDo => view.to_do.push(task),
                TaskStatus::InProgress => view.in_progress.push(task),
                TaskStatus::Done => view.done.push(task),
                TaskStatus::PendingApproval => view.pending_approval.push(task),
            }
        }
        Ok(view)
    }

    /// Returns the declined tasks the session account created on its
    /// partner's board, oldest first.
    ///
    /// Without a linked partner the view is empty.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::AccountNotFound`] when the session account
    /// is missing, or [`TaskBoardError::Store`] when the listing fails.
    pub async fn declined_for_creator(&self, session: &Session) -> TaskBoardResult<Vec<Task>> {
        let me = self.require_account(session.account_id()).await?;
        let Some(partner_id) = me.partner_id() else {
            return Ok(Vec::new());
        };

        let mut tasks = self.store.list_by_owner(partner_id).await?;
        tasks.retain(|task| {
            task.is_declined() && task.creator_id() == Some(session.account_id())
        });
        tasks.sort_by_key(Task::created_at);
        Ok(tasks)
    }

    /// Computes a task's due-state bucket at the service's clock.
    #[must_use]
    pub fn due_state(&self, task: &Task) -> DueState {
        task.due_state(&*self.clock)
    }

    async fn require_task(&self, id: TaskId) -> TaskBoardResult<Task> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(TaskBoardError::TaskNotFound(id))
    }

    async fn require_account(&self, id: AccountId) -> TaskBoardResult<Account> {
        self.directory
            .find_by_id(id)
            .await
            .map_err(board_error)?
            .ok_or(TaskBoardError::AccountNotFound(id))
    }
}
