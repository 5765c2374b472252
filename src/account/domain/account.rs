//! Account aggregate root: identity, partner link, and pending invitations.

use super::{AccountDomainError, AccountId, AccountProfile, EmailAddress, PartnerRole};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Account aggregate root.
///
/// The invitation set is kept in insertion order and never contains the
/// account's own id or a duplicate entry. The partner link is a plain
/// reference here; reciprocity across two accounts is enforced by the
/// directory port's atomic pairing operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    email: EmailAddress,
    first_name: String,
    last_name: String,
    role: PartnerRole,
    partner_id: Option<AccountId>,
    invitations: Vec<AccountId>,
    profile: AccountProfile,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted account aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAccountData {
    /// Persisted account identifier.
    pub id: AccountId,
    /// Persisted email address.
    pub email: EmailAddress,
    /// Persisted first name.
    pub first_name: String,
    /// Persisted last name.
    pub last_name: String,
    /// Persisted partner role.
    pub role: PartnerRole,
    /// Persisted partner link, if any.
    pub partner_id: Option<AccountId>,
    /// Persisted invitation set in insertion order.
    pub invitations: Vec<AccountId>,
    /// Persisted profile attributes.
    pub profile: AccountProfile,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new unlinked account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError::EmptyFirstName`] or
    /// [`AccountDomainError::EmptyLastName`] when a name is blank after
    /// trimming.
    pub fn new(
        email: EmailAddress,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: PartnerRole,
        clock: &impl Clock,
    ) -> Result<Self, AccountDomainError> {
        let first_name = first_name.into();
        if first_name.trim().is_empty() {
            return Err(AccountDomainError::EmptyFirstName);
        }
        let last_name = last_name.into();
        if last_name.trim().is_empty() {
            return Err(AccountDomainError::EmptyLastName);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: AccountId::new(),
            email,
            first_name,
            last_name,
            role,
            partner_id: None,
            invitations: Vec::new(),
            profile: AccountProfile::new(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs an account from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAccountData) -> Self {
        Self {
            id: data.id,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            role: data.role,
            partner_id: data.partner_id,
            invitations: data.invitations,
            profile: data.profile,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the account identifier.
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the first name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Returns the last name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Returns the partner role.
    #[must_use]
    pub const fn role(&self) -> PartnerRole {
        self.role
    }

    /// Returns the linked partner, if any.
    #[must_use]
    pub const fn partner_id(&self) -> Option<AccountId> {
        self.partner_id
    }

    /// Returns whether a partner is linked.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.partner_id.is_some()
    }

    /// Returns the pending invitation senders in insertion order.
    #[must_use]
    pub fn invitations(&self) -> &[AccountId] {
        &self.invitations
    }

    /// Returns whether the given sender has a pending invitation here.
    #[must_use]
    pub fn has_invitation_from(&self, sender: AccountId) -> bool {
        self.invitations.contains(&sender)
    }

    /// Returns the profile attributes.
    #[must_use]
    pub const fn profile(&self) -> &AccountProfile {
        &self.profile
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Records a pending invitation from `sender`.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError::SelfInvitation`] when `sender` is this
    /// account, or [`AccountDomainError::DuplicateInvitation`] when the
    /// sender is already present in the set.
    pub fn record_invitation(
        &mut self,
        sender: AccountId,
        clock: &impl Clock,
    ) -> Result<(), AccountDomainError> {
        if sender == self.id {
            return Err(AccountDomainError::SelfInvitation(self.id));
        }
        if self.invitations.contains(&sender) {
            return Err(AccountDomainError::DuplicateInvitation {
                recipient: self.id,
                sender,
            });
        }
        self.invitations.push(sender);
        self.touch(clock);
        Ok(())
    }

    /// Removes a pending invitation from `sender`, if present.
    ///
    /// Returns whether an entry was removed. Removing an absent sender is a
    /// no-op, which keeps rejection and stale-invitation pruning idempotent.
    pub fn withdraw_invitation(&mut self, sender: AccountId, clock: &impl Clock) -> bool {
        let before = self.invitations.len();
        self.invitations.retain(|candidate| *candidate != sender);
        let removed = self.invitations.len() != before;
        if removed {
            self.touch(clock);
        }
        removed
    }

    /// Links this account to `partner`.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError::SelfPartner`] when `partner` is this
    /// account, or [`AccountDomainError::AlreadyLinked`] when a partner is
    /// already set.
    pub fn link_to(
        &mut self,
        partner: AccountId,
        clock: &impl Clock,
    ) -> Result<(), AccountDomainError> {
        if partner == self.id {
            return Err(AccountDomainError::SelfPartner(self.id));
        }
        if let Some(current) = self.partner_id {
            return Err(AccountDomainError::AlreadyLinked {
                account: self.id,
                partner: current,
            });
        }
        self.partner_id = Some(partner);
        self.touch(clock);
        Ok(())
    }

    /// Clears the link to `partner`.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError::NotLinkedTo`] when the account is not
    /// currently linked to `partner`.
    pub fn unlink_from(
        &mut self,
        partner: AccountId,
        clock: &impl Clock,
    ) -> Result<(), AccountDomainError> {
        if self.partner_id != Some(partner) {
            return Err(AccountDomainError::NotLinkedTo {
                account: self.id,
                expected: partner,
            });
        }
        self.partner_id = None;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the profile attributes.
    pub fn update_profile(&mut self, profile: AccountProfile, clock: &impl Clock) {
        self.profile = profile;
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
