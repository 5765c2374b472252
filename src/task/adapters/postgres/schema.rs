//! Diesel schema for task persistence.

diesel::table! {
    /// Task records keyed to the owning board.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Account whose board the task sits on.
        owner_id -> Uuid,
        /// Creating account, if attribution was recorded.
        creator_id -> Nullable<Uuid>,
        /// Authorship marker relative to the owner.
        #[max_length = 20]
        authorship -> Varchar,
        /// Short title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Due date.
        due_date -> Timestamptz,
        /// Priority on the three-step scale.
        #[max_length = 20]
        priority -> Varchar,
        /// Lifecycle status.
        #[max_length = 30]
        status -> Varchar,
        /// Declined flag.
        declined -> Bool,
        /// Decline reason, if declined.
        decline_message -> Nullable<Text>,
        /// Whether the content fields were edited after creation.
        edited -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
