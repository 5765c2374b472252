//! Diesel row models for account persistence.

use super::schema::accounts;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for account records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountRow {
    /// Account identifier.
    pub id: uuid::Uuid,
    /// Normalized email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Partner role.
    pub role: String,
    /// Linked partner, if any.
    pub partner_id: Option<uuid::Uuid>,
    /// Invitation senders as a JSON array.
    pub invitations: Value,
    /// Profile attributes as a JSON object.
    pub profile: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccountRow {
    /// Account identifier.
    pub id: uuid::Uuid,
    /// Normalized email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Partner role.
    pub role: String,
    /// Linked partner, if any.
    pub partner_id: Option<uuid::Uuid>,
    /// Invitation senders as a JSON array.
    pub invitations: Value,
    /// Profile attributes as a JSON object.
    pub profile: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
