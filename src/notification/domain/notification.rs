//! Notification aggregate and kind classification.

use super::{NotificationDomainError, NotificationId, ParseNotificationKindError};
use crate::account::domain::AccountId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a notification is about. Drives the feed's query split and the
/// icon shown next to the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Something happened to a task (declined, awaiting approval).
    Task,
    /// Something happened to a partnership invitation.
    Invitation,
    /// A task disappeared as a side effect of another workflow.
    TaskDeleted,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Invitation => "invitation",
            Self::TaskDeleted => "task_deleted",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "task" => Ok(Self::Task),
            "invitation" => Ok(Self::Invitation),
            "task_deleted" => Ok(Self::TaskDeleted),
            _ => Err(ParseNotificationKindError(value.to_owned())),
        }
    }
}

/// Notification aggregate root.
///
/// Owned by the recipient; only the recipient marks it read or deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    recipient_id: AccountId,
    kind: NotificationKind,
    message: String,
    related_id: Option<Uuid>,
    task_title: Option<String>,
    created_at: DateTime<Utc>,
    read: bool,
}

/// Parameter object for reconstructing a persisted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotificationData {
    /// Persisted notification identifier.
    pub id: NotificationId,
    /// Persisted recipient.
    pub recipient_id: AccountId,
    /// Persisted kind.
    pub kind: NotificationKind,
    /// Persisted message text.
    pub message: String,
    /// Persisted reference to the related record, if any.
    pub related_id: Option<Uuid>,
    /// Persisted task title, if the notification concerns a task.
    pub task_title: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted read flag.
    pub read: bool,
}

impl Notification {
    /// Creates a new unread notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::EmptyMessage`] when the message is
    /// blank after trimming.
    pub fn new(
        recipient_id: AccountId,
        kind: NotificationKind,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, NotificationDomainError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(NotificationDomainError::EmptyMessage);
        }
        Ok(Self {
            id: NotificationId::new(),
            recipient_id,
            kind,
            message,
            related_id: None,
            task_title: None,
            created_at: clock.utc(),
            read: false,
        })
    }

    /// Reconstructs a notification from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNotificationData) -> Self {
        Self {
            id: data.id,
            recipient_id: data.recipient_id,
            kind: data.kind,
            message: data.message,
            related_id: data.related_id,
            task_title: data.task_title,
            created_at: data.created_at,
            read: data.read,
        }
    }

    /// Attaches the id of the record the notification is about.
    #[must_use]
    pub const fn with_related_id(mut self, related_id: Uuid) -> Self {
        self.related_id = Some(related_id);
        self
    }

    /// Attaches the title of the task the notification is about.
    #[must_use]
    pub fn with_task_title(mut self, task_title: impl Into<String>) -> Self {
        self.task_title = Some(task_title.into());
        self
    }

    /// Returns the notification identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn recipient_id(&self) -> AccountId {
        self.recipient_id
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the related record id, if any.
    #[must_use]
    pub const fn related_id(&self) -> Option<Uuid> {
        self.related_id
    }

    /// Returns the related task title, if any.
    #[must_use]
    pub fn task_title(&self) -> Option<&str> {
        self.task_title.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the recipient has read the notification.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read
    }

    /// Marks the notification as read. Idempotent.
    pub const fn mark_read(&mut self) {
        self.read = true;
    }
}
