//! Task aggregate root and authorship attribution.

use super::{
    DueState, ParseTaskAuthorshipError, TaskDomainError, TaskId, TaskPriority, TaskStatus,
};
use crate::account::domain::AccountId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a task, relative to the account whose board it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskAuthorship {
    /// The board owner created the task for themselves.
    #[serde(rename = "self")]
    SelfAuthored,
    /// The owner's partner created the task and assigned it over.
    #[serde(rename = "partner")]
    PartnerAssigned,
}

impl TaskAuthorship {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelfAuthored => "self",
            Self::PartnerAssigned => "partner",
        }
    }
}

impl fmt::Display for TaskAuthorship {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskAuthorship {
    type Error = ParseTaskAuthorshipError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "self" => Ok(Self::SelfAuthored),
            "partner" => Ok(Self::PartnerAssigned),
            _ => Err(ParseTaskAuthorshipError(value.to_owned())),
        }
    }
}

/// Validated content fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Short title shown on the board.
    pub title: String,
    /// Longer free-form description.
    pub description: String,
    /// When the task falls due.
    pub due_date: DateTime<Utc>,
    /// Urgency on the three-step scale.
    pub priority: TaskPriority,
}

/// Task aggregate root.
///
/// The declined flag is orthogonal to the status: a declined task keeps its
/// status but leaves the active board views until it is reactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner_id: AccountId,
    creator_id: Option<AccountId>,
    authorship: TaskAuthorship,
    title: String,
    description: String,
    due_date: DateTime<Utc>,
    priority: TaskPriority,
    status: TaskStatus,
    declined: bool,
    decline_message: Option<String>,
    edited: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted board owner.
    pub owner_id: AccountId,
    /// Persisted creator attribution, if any.
    pub creator_id: Option<AccountId>,
    /// Persisted authorship marker.
    pub authorship: TaskAuthorship,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted due date.
    pub due_date: DateTime<Utc>,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted declined flag.
    pub declined: bool,
    /// Persisted decline reason, if any.
    pub decline_message: Option<String>,
    /// Persisted edited flag.
    pub edited: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task on the given owner's board with status To Do.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the draft title is blank
    /// after trimming.
    pub fn new(
        owner_id: AccountId,
        creator_id: Option<AccountId>,
        authorship: TaskAuthorship,
        draft: TaskDraft,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        if draft.title.trim().is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            owner_id,
            creator_id,
            authorship,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            priority: draft.priority,
            status: TaskStatus::ToDo,
            declined: false,
            decline_message: None,
            edited: false,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner_id: data.owner_id,
            creator_id: data.creator_id,
            authorship: data.authorship,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            priority: data.priority,
            status: data.status,
            declined: data.declined,
            decline_message: data.decline_message,
            edited: data.edited,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the account whose board the task sits on.
    #[must_use]
    pub const fn owner_id(&self) -> AccountId {
        self.owner_id
    }

    /// Returns the creating account, if attribution was recorded.
    #[must_use]
    pub const fn creator_id(&self) -> Option<AccountId> {
        self.creator_id
    }

    /// Returns the authorship marker relative to the owner.
    #[must_use]
    pub const fn authorship(&self) -> TaskAuthorship {
        self.authorship
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns whether the declined flag is set.
    #[must_use]
    pub const fn is_declined(&self) -> bool {
        self.declined
    }

    /// Returns the decline reason, if the task is declined.
    #[must_use]
    pub fn decline_message(&self) -> Option<&str> {
        self.decline_message.as_deref()
    }

    /// Returns whether the content fields were edited after creation.
    #[must_use]
    pub const fn is_edited(&self) -> bool {
        self.edited
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Computes the due-state bucket at the current clock time.
    #[must_use]
    pub fn due_state(&self, clock: &impl Clock) -> DueState {
        DueState::at(self.due_date, clock.utc())
    }

    /// Moves the task to a new lifecycle status.
    ///
    /// The Done -> To Do restart must carry a fresh due date, which replaces
    /// the stored one. No other transition takes extra input.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the state
    /// machine forbids the change, or
    /// [`TaskDomainError::RestartRequiresDueDate`] when a restart omits the
    /// new due date.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        new_due_date: Option<DateTime<Utc>>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        if self.status == TaskStatus::Done && target == TaskStatus::ToDo {
            let due_date = new_due_date.ok_or(TaskDomainError::RestartRequiresDueDate(self.id))?;
            self.due_date = due_date;
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Sets the declined flag with the given reason.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDeclineReason`] when the reason is
    /// blank, [`TaskDomainError::DeclineCompletedTask`] when the task is
    /// already done, or [`TaskDomainError::AlreadyDeclined`] when the flag
    /// is already set.
    pub fn decline(
        &mut self,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(TaskDomainError::EmptyDeclineReason);
        }
        if self.status == TaskStatus::Done {
            return Err(TaskDomainError::DeclineCompletedTask(self.id));
        }
        if self.declined {
            return Err(TaskDomainError::AlreadyDeclined(self.id));
        }
        self.declined = true;
        self.decline_message = Some(reason);
        self.touch(clock);
        Ok(())
    }

    /// Clears the declined flag and restores the task to To Do.
    ///
    /// The due date is left untouched; the restart guard applies only to
    /// finishing and reopening work, not to undoing a decline.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotDeclined`] when the flag is not set.
    pub fn reactivate(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if !self.declined {
            return Err(TaskDomainError::NotDeclined(self.id));
        }
        self.declined = false;
        self.decline_message = None;
        self.status = TaskStatus::ToDo;
        self.touch(clock);
        Ok(())
    }

    /// Overwrites the content fields and marks the task as edited.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the new title is blank
    /// after trimming.
    pub fn edit(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        self.title = title;
        self.description = description.into();
        self.due_date = due_date;
        self.edited = true;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
