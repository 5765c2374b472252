//! Diesel schema for account persistence.

diesel::table! {
    /// Account records with partner link and invitation set.
    accounts (id) {
        /// Account identifier.
        id -> Uuid,
        /// Normalized email address, unique across accounts.
        #[max_length = 255]
        email -> Varchar,
        /// First name.
        #[max_length = 255]
        first_name -> Varchar,
        /// Last name.
        #[max_length = 255]
        last_name -> Varchar,
        /// Partner role.
        #[max_length = 20]
        role -> Varchar,
        /// Linked partner, if any.
        partner_id -> Nullable<Uuid>,
        /// Pending invitation senders in insertion order.
        invitations -> Jsonb,
        /// Optional profile attributes.
        profile -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
