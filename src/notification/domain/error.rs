//! Error types for notification domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain notification values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationDomainError {
    /// The rendered message is empty after trimming.
    #[error("notification message must not be empty")]
    EmptyMessage,

    /// A message template failed to render.
    #[error("template rendering failed: {0}")]
    Template(String),
}

/// Error returned while parsing notification kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification kind: {0}")]
pub struct ParseNotificationKindError(pub String);
