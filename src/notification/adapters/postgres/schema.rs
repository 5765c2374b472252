//! Diesel schema for notification persistence.

diesel::table! {
    /// Notification records keyed to the recipient.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Recipient account.
        recipient_id -> Uuid,
        /// Kind classification.
        #[max_length = 30]
        kind -> Varchar,
        /// Rendered message text.
        message -> Text,
        /// Related record, if any.
        related_id -> Nullable<Uuid>,
        /// Related task title, if any.
        #[max_length = 255]
        task_title -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Read flag.
        read -> Bool,
    }
}
