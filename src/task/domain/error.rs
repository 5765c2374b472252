//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// No due date was supplied.
    #[error("task due date is required")]
    MissingDueDate,

    /// The requested status change is not a permitted transition.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Task whose status change was rejected.
        task_id: TaskId,
        /// Status the task currently holds.
        from: TaskStatus,
        /// Status the caller requested.
        to: TaskStatus,
    },

    /// Restarting a finished task requires a fresh due date.
    #[error("restarting task {0} requires a new due date")]
    RestartRequiresDueDate(TaskId),

    /// The decline reason is empty after trimming.
    #[error("a decline reason must not be empty")]
    EmptyDeclineReason,

    /// A finished task cannot be declined.
    #[error("task {0} is already done and cannot be declined")]
    DeclineCompletedTask(TaskId),

    /// The task already carries the declined flag.
    #[error("task {0} is already declined")]
    AlreadyDeclined(TaskId),

    /// Reactivation requires the declined flag.
    #[error("task {0} is not declined")]
    NotDeclined(TaskId),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing task authorship markers from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task authorship: {0}")]
pub struct ParseTaskAuthorshipError(pub String);
