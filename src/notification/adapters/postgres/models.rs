//! Diesel row models for notification persistence.

use super::schema::notifications;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for notification records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Recipient account.
    pub recipient_id: uuid::Uuid,
    /// Kind classification.
    pub kind: String,
    /// Rendered message text.
    pub message: String,
    /// Related record, if any.
    pub related_id: Option<uuid::Uuid>,
    /// Related task title, if any.
    pub task_title: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Read flag.
    pub read: bool,
}

/// Insert model for notification records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Recipient account.
    pub recipient_id: uuid::Uuid,
    /// Kind classification.
    pub kind: String,
    /// Rendered message text.
    pub message: String,
    /// Related record, if any.
    pub related_id: Option<uuid::Uuid>,
    /// Related task title, if any.
    pub task_title: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Read flag.
    pub read: bool,
}
