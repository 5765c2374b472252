//! In-memory directory for linking-workflow tests and local use.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tokio::sync::broadcast;

use crate::account::{
    domain::{Account, AccountDomainError, AccountId, EmailAddress},
    ports::{AccountEvent, Directory, DirectoryError, DirectoryResult, LinkedAccounts},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Thread-safe in-memory directory.
///
/// All pairing operations run under a single write guard, so the atomicity
/// the contract demands holds trivially.
#[derive(Clone)]
pub struct InMemoryDirectory<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<DirectoryState>>,
    events: broadcast::Sender<AccountEvent>,
    clock: Arc<C>,
}

#[derive(Default)]
struct DirectoryState {
    accounts: HashMap<AccountId, Account>,
    email_index: HashMap<EmailAddress, AccountId>,
}

impl Default for InMemoryDirectory<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectory<DefaultClock> {
    /// Creates an empty directory backed by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl<C> InMemoryDirectory<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty directory backed by the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(DirectoryState::default())),
            events,
            clock,
        }
    }

    fn write_state(&self) -> DirectoryResult<RwLockWriteGuard<'_, DirectoryState>> {
        self.state
            .write()
            .map_err(|err| DirectoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn publish(&self, account: &Account) {
        // Send fails only when no subscriber is listening.
        drop(self.events.send(AccountEvent::Updated(account.clone())));
    }
}

fn account_mut(
    state: &mut DirectoryState,
    id: AccountId,
) -> DirectoryResult<&mut Account> {
    state
        .accounts
        .get_mut(&id)
        .ok_or(DirectoryError::NotFound(id))
}

fn require_unpartnered(account: &Account) -> DirectoryResult<()> {
    if account.is_linked() {
        return Err(DirectoryError::AlreadyPartnered(account.id()));
    }
    Ok(())
}

fn require_linked_to(account: &Account, expected: AccountId) -> DirectoryResult<()> {
    if account.partner_id() != Some(expected) {
        return Err(AccountDomainError::NotLinkedTo {
            account: account.id(),
            expected,
        }
        .into());
    }
    Ok(())
}

#[async_trait]
impl<C> Directory for InMemoryDirectory<C>
where
    C: Clock + Send + Sync,
{
    async fn insert(&self, account: &Account) -> DirectoryResult<()> {
        let mut state = self.write_state()?;
        if state.accounts.contains_key(&account.id()) {
            return Err(DirectoryError::DuplicateAccount(account.id()));
        }
        if state.email_index.contains_key(account.email()) {
            return Err(DirectoryError::DuplicateEmail(account.email().clone()));
        }

        state.email_index.insert(account.email().clone(), account.id());
        state.accounts.insert(account.id(), account.clone());
        drop(state);
        self.publish(account);
        Ok(())
    }

    async fn update(&self, account: &Account) -> DirectoryResult<()> {
        let mut state = self.write_state()?;
        let previous = account_mut(&mut state, account.id())?;
        let previous_email = previous.email().clone();
        *previous = account.clone();
        if previous_email != *account.email() {
            state.email_index.remove(&previous_email);
            state.email_index.insert(account.email().clone(), account.id());
        }
        drop(state);
        self.publish(account);
        Ok(())
    }

    async fn find_by_id(&self, id: AccountId) -> DirectoryResult<Option<Account>> {
        let state = self
            .state
            .read()
            .map_err(|err| DirectoryError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> DirectoryResult<Option<Account>> {
        let state = self
            .state
            .read()
            .map_err(|err| DirectoryError::persistence(std::io::Error::other(err.to_string())))?;
        let account = state
            .email_index
            .get(email)
            .and_then(|id| state.accounts.get(id))
            .cloned();
        Ok(account)
    }

    async fn append_invitation(
        &self,
        recipient: AccountId,
        sender: AccountId,
    ) -> DirectoryResult<Account> {
        let mut state = self.write_state()?;
        let record = account_mut(&mut state, recipient)?;
        record.record_invitation(sender, &*self.clock)?;
        let updated = record.clone();
        drop(state);
        self.publish(&updated);
        Ok(updated)
    }

    async fn remove_invitation(
        &self,
        recipient: AccountId,
        sender: AccountId,
    ) -> DirectoryResult<Account> {
        let mut state = self.write_state()?;
        let record = account_mut(&mut state, recipient)?;
        let removed = record.withdraw_invitation(sender, &*self.clock);
        let updated = record.clone();
        drop(state);
        if removed {
            self.publish(&updated);
        }
        Ok(updated)
    }

    async fn link_partners(
        &self,
        accepting: AccountId,
        inviter: AccountId,
    ) -> DirectoryResult<LinkedAccounts> {
        if accepting == inviter {
            return Err(AccountDomainError::SelfPartner(accepting).into());
        }
        let mut state = self.write_state()?;

        // Validate both sides before mutating either.
        require_unpartnered(account_mut(&mut state, accepting)?)?;
        require_unpartnered(account_mut(&mut state, inviter)?)?;

        let accepting_record = account_mut(&mut state, accepting)?;
        accepting_record.withdraw_invitation(inviter, &*self.clock);
        accepting_record.link_to(inviter, &*self.clock)?;
        let accepting_updated = accepting_record.clone();

        let inviter_record = account_mut(&mut state, inviter)?;
        inviter_record.link_to(accepting, &*self.clock)?;
        let inviter_updated = inviter_record.clone();

        drop(state);
        self.publish(&accepting_updated);
        self.publish(&inviter_updated);
        Ok(LinkedAccounts {
            initiator: accepting_updated,
            counterpart: inviter_updated,
        })
    }

    async fn unlink_partners(
        &self,
        leaving: AccountId,
        partner: AccountId,
    ) -> DirectoryResult<LinkedAccounts> {
        let mut state = self.write_state()?;

        // Validate reciprocity on both sides before mutating either.
        require_linked_to(account_mut(&mut state, leaving)?, partner)?;
        require_linked_to(account_mut(&mut state, partner)?, leaving)?;

        let leaving_record = account_mut(&mut state, leaving)?;
        leaving_record.unlink_from(partner, &*self.clock)?;
        let leaving_updated = leaving_record.clone();

        let partner_record = account_mut(&mut state, partner)?;
        partner_record.unlink_from(leaving, &*self.clock)?;
        let partner_updated = partner_record.clone();

        drop(state);
        self.publish(&leaving_updated);
        self.publish(&partner_updated);
        Ok(LinkedAccounts {
            initiator: leaving_updated,
            counterpart: partner_updated,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<AccountEvent> {
        self.events.subscribe()
    }
}
