//! Error types for account domain validation and parsing.

use super::AccountId;
use thiserror::Error;

/// Errors returned while constructing or mutating domain account values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountDomainError {
    /// The email address is not structurally valid.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The first name is empty after trimming.
    #[error("first name must not be empty")]
    EmptyFirstName,

    /// The last name is empty after trimming.
    #[error("last name must not be empty")]
    EmptyLastName,

    /// An account attempted to invite itself.
    #[error("account {0} cannot invite itself")]
    SelfInvitation(AccountId),

    /// The sender already has a pending invitation on this account.
    #[error("account {sender} already has a pending invitation on account {recipient}")]
    DuplicateInvitation {
        /// Account holding the invitation set.
        recipient: AccountId,
        /// Account that proposed the link.
        sender: AccountId,
    },

    /// An account attempted to link to itself.
    #[error("account {0} cannot become its own partner")]
    SelfPartner(AccountId),

    /// The account is already linked to a partner.
    #[error("account {account} is already linked to partner {partner}")]
    AlreadyLinked {
        /// Account that refused the new link.
        account: AccountId,
        /// Partner the account is currently linked to.
        partner: AccountId,
    },

    /// The account is not linked to the expected partner.
    #[error("account {account} is not linked to {expected}")]
    NotLinkedTo {
        /// Account whose link was inspected.
        account: AccountId,
        /// Partner the caller expected to find.
        expected: AccountId,
    },
}

/// Error returned while parsing partner roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown partner role: {0}")]
pub struct ParsePartnerRoleError(pub String);
