//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Account whose board the task sits on.
    pub owner_id: uuid::Uuid,
    /// Creating account, if attribution was recorded.
    pub creator_id: Option<uuid::Uuid>,
    /// Authorship marker relative to the owner.
    pub authorship: String,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Due date.
    pub due_date: DateTime<Utc>,
    /// Priority on the three-step scale.
    pub priority: String,
    /// Lifecycle status.
    pub status: String,
    /// Declined flag.
    pub declined: bool,
    /// Decline reason, if declined.
    pub decline_message: Option<String>,
    /// Whether the content fields were edited after creation.
    pub edited: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Account whose board the task sits on.
    pub owner_id: uuid::Uuid,
    /// Creating account, if attribution was recorded.
    pub creator_id: Option<uuid::Uuid>,
    /// Authorship marker relative to the owner.
    pub authorship: String,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Due date.
    pub due_date: DateTime<Utc>,
    /// Priority on the three-step scale.
    pub priority: String,
    /// Lifecycle status.
    pub status: String,
    /// Declined flag.
    pub declined: bool,
    /// Decline reason, if declined.
    pub decline_message: Option<String>,
    /// Whether the content fields were edited after creation.
    pub edited: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
