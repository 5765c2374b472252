//! Domain model for the task lifecycle.
//!
//! The task domain models creation on either partner's board, the status
//! state machine, the orthogonal declined flag, and the derived due-state
//! buckets while keeping all infrastructure concerns outside of the domain
//! boundary.

mod due;
mod error;
mod ids;
mod status;
mod task;

pub use due::DueState;
pub use error::{
    ParseTaskAuthorshipError, ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError,
};
pub use ids::TaskId;
pub use status::{TaskPriority, TaskStatus};
pub use task::{PersistedTaskData, Task, TaskAuthorship, TaskDraft};
