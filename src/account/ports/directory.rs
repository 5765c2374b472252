//! Directory port for account persistence, lookup, and atomic pairing.

use crate::account::domain::{Account, AccountDomainError, AccountId, EmailAddress};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Change event published by a directory implementation after a successful
/// write. Subscribers receive the full updated record.
#[derive(Debug, Clone)]
pub enum AccountEvent {
    /// An account record was created or mutated.
    Updated(Account),
}

/// The two sides of a pairing operation, returned together so callers
/// observe a consistent snapshot of both records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccounts {
    /// The account on whose behalf the operation ran.
    pub initiator: Account,
    /// The other side of the link.
    pub counterpart: Account,
}

/// Account persistence contract.
///
/// Pairing touches two records that must stay consistent, so the contract
/// exposes `link_partners` and `unlink_partners` as single atomic
/// operations: implementations apply both sides under one lock or one
/// transaction and reject the whole operation on any precondition failure.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Stores a new account.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateAccount`] when the id already
    /// exists or [`DirectoryError::DuplicateEmail`] when the email is taken.
    async fn insert(&self, account: &Account) -> DirectoryResult<()>;

    /// Persists changes to an existing account record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] when the account does not exist.
    async fn update(&self, account: &Account) -> DirectoryResult<()>;

    /// Finds an account by identifier.
    ///
    /// Returns `None` when the account does not exist.
    async fn find_by_id(&self, id: AccountId) -> DirectoryResult<Option<Account>>;

    /// Finds an account by normalized email address.
    ///
    /// Returns `None` when no account uses the address.
    async fn find_by_email(&self, email: &EmailAddress) -> DirectoryResult<Option<Account>>;

    /// Appends `sender` to the recipient's pending invitation set.
    ///
    /// Returns the updated recipient record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] when the recipient does not
    /// exist, or [`DirectoryError::Domain`] when the append violates an
    /// invitation invariant (self-invitation, duplicate entry).
    async fn append_invitation(
        &self,
        recipient: AccountId,
        sender: AccountId,
    ) -> DirectoryResult<Account>;

    /// Removes `sender` from the recipient's pending invitation set.
    ///
    /// Removing an absent sender is a no-op; the updated recipient record is
    /// returned either way.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] when the recipient does not
    /// exist.
    async fn remove_invitation(
        &self,
        recipient: AccountId,
        sender: AccountId,
    ) -> DirectoryResult<Account>;

    /// Atomically establishes a reciprocal partner link.
    ///
    /// Sets `accepting.partner_id = inviter` and `inviter.partner_id =
    /// accepting`, and removes `inviter` from the accepting side's
    /// invitation set. Either both records are written or neither is.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] when either account is missing,
    /// or [`DirectoryError::AlreadyPartnered`] when either side gained a
    /// partner since the invitation was sent.
    async fn link_partners(
        &self,
        accepting: AccountId,
        inviter: AccountId,
    ) -> DirectoryResult<LinkedAccounts>;

    /// Atomically dissolves a reciprocal partner link.
    ///
    /// Clears `partner_id` on both sides. Either both records are written or
    /// neither is.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] when either account is missing,
    /// or [`DirectoryError::Domain`] when the two records are not linked to
    /// each other.
    async fn unlink_partners(
        &self,
        leaving: AccountId,
        partner: AccountId,
    ) -> DirectoryResult<LinkedAccounts>;

    /// Subscribes to account change events.
    ///
    /// Dropping the receiver ends the subscription.
    fn subscribe(&self) -> broadcast::Receiver<AccountEvent>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// An account with the same identifier already exists.
    #[error("duplicate account identifier: {0}")]
    DuplicateAccount(AccountId),

    /// An account with the same email address already exists.
    #[error("duplicate account email: {0}")]
    DuplicateEmail(EmailAddress),

    /// The account was not found.
    #[error("account not found: {0}")]
    NotFound(AccountId),

    /// A pairing precondition failed: the account already has a partner.
    #[error("account {0} already has a partner")]
    AlreadyPartnered(AccountId),

    /// A domain invariant was violated while mutating a record.
    #[error(transparent)]
    Domain(#[from] AccountDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for DirectoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
