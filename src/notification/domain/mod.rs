//! Domain model for notifications.
//!
//! Notifications are write-once records produced as side effects of the
//! linking and task workflows; the recipient may mark them read or delete
//! them. Message text is composed by the notification services before the
//! record enters the domain.

mod error;
mod ids;
mod notification;

pub use error::{NotificationDomainError, ParseNotificationKindError};
pub use ids::NotificationId;
pub use notification::{Notification, NotificationKind, PersistedNotificationData};
