//! `PostgreSQL` directory implementation.

use super::{
    models::{AccountRow, NewAccountRow},
    schema::accounts,
};
use crate::account::{
    domain::{Account, AccountId, AccountProfile, EmailAddress, PartnerRole, PersistedAccountData},
    ports::{AccountEvent, Directory, DirectoryError, DirectoryResult, LinkedAccounts},
};
use crate::db::PgPool;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// `PostgreSQL`-backed directory.
///
/// Pairing operations run inside a single transaction with both rows locked
/// in id order, so concurrent pairings cannot deadlock or observe a
/// half-linked state. Change events reflect writes made through this
/// process.
#[derive(Clone)]
pub struct PostgresDirectory<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    pool: PgPool,
    events: broadcast::Sender<AccountEvent>,
    clock: Arc<C>,
}

impl PostgresDirectory<DefaultClock> {
    /// Creates a new directory from a connection pool, backed by the system
    /// clock.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }
}

impl<C> PostgresDirectory<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new directory from a connection pool and clock.
    #[must_use]
    pub fn with_clock(pool: PgPool, clock: Arc<C>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            pool,
            events,
            clock,
        }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DirectoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DirectoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DirectoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(DirectoryError::persistence)?
    }

    fn publish(&self, account: &Account) {
        // Send fails only when no subscriber is listening.
        drop(self.events.send(AccountEvent::Updated(account.clone())));
    }
}

#[async_trait]
impl<C> Directory for PostgresDirectory<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn insert(&self, account: &Account) -> DirectoryResult<()> {
        let account_id = account.id();
        let email = account.email().clone();
        let new_row = to_new_row(account)?;

        self.run_blocking(move |connection| {
            // The pre-checks improve semantic error reporting; the unique
            // constraints still enforce integrity in the window between
            // check and insert.
            let id_taken: i64 = accounts::table
                .filter(accounts::id.eq(account_id.into_inner()))
                .count()
                .get_result(connection)
                .map_err(DirectoryError::persistence)?;
            if id_taken > 0 {
                return Err(DirectoryError::DuplicateAccount(account_id));
            }

            let email_taken: i64 = accounts::table
                .filter(accounts::email.eq(email.as_str()))
                .count()
                .get_result(connection)
                .map_err(DirectoryError::persistence)?;
            if email_taken > 0 {
                return Err(DirectoryError::DuplicateEmail(email.clone()));
            }

            diesel::insert_into(accounts::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_email_unique_violation(info.as_ref()) =>
                    {
                        DirectoryError::DuplicateEmail(email.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DirectoryError::DuplicateAccount(account_id)
                    }
                    _ => DirectoryError::persistence(err),
                })?;
            Ok(())
        })
        .await?;

        self.publish(account);
        Ok(())
    }

    async fn update(&self, account: &Account) -> DirectoryResult<()> {
        let updated = account.clone();
        self.run_blocking(move |connection| {
            let written = persist_account(connection, &updated)?;
            if written == 0 {
                return Err(DirectoryError::NotFound(updated.id()));
            }
            Ok(())
        })
        .await?;

        self.publish(account);
        Ok(())
    }

    async fn find_by_id(&self, id: AccountId) -> DirectoryResult<Option<Account>> {
        self.run_blocking(move |connection| {
            let row = accounts::table
                .filter(accounts::id.eq(id.into_inner()))
                .select(AccountRow::as_select())
                .first::<AccountRow>(connection)
                .optional()
                .map_err(DirectoryError::persistence)?;
            row.map(row_to_account).transpose()
        })
        .await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> DirectoryResult<Option<Account>> {
        let lookup = email.clone();
        self.run_blocking(move |connection| {
            let row = accounts::table
                .filter(accounts::email.eq(lookup.as_str()))
                .select(AccountRow::as_select())
                .first::<AccountRow>(connection)
                .optional()
                .map_err(DirectoryError::persistence)?;
            row.map(row_to_account).transpose()
        })
        .await
    }

    async fn append_invitation(
        &self,
        recipient: AccountId,
        sender: AccountId,
    ) -> DirectoryResult<Account> {
        let clock = Arc::clone(&self.clock);
        let updated = self
            .run_blocking(move |connection| {
                connection.transaction::<_, DirectoryError, _>(|tx| {
                    let mut record = lock_account(tx, recipient)?;
                    record.record_invitation(sender, &*clock)?;
                    persist_account(tx, &record)?;
                    Ok(record)
                })
            })
            .await?;

        self.publish(&updated);
        Ok(updated)
    }

    async fn remove_invitation(
        &self,
        recipient: AccountId,
        sender: AccountId,
    ) -> DirectoryResult<Account> {
        let clock = Arc::clone(&self.clock);
        let (updated, removed) = self
            .run_blocking(move |connection| {
                connection.transaction::<_, DirectoryError, _>(|tx| {
                    let mut record = lock_account(tx, recipient)?;
                    let removed = record.withdraw_invitation(sender, &*clock);
                    if removed {
                        persist_account(tx, &record)?;
                    }
                    Ok((record, removed))
                })
            })
            .await?;

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
        let clock = Arc::clone(&self.clock);
        let linked = self
            .run_blocking(move |connection| {
                connection.transaction::<_, DirectoryError, _>(|tx| {
                    let (mut accepting_record, mut inviter_record) =
                        lock_pair(tx, accepting, inviter)?;

                    if accepting_record.is_linked() {
                        return Err(DirectoryError::AlreadyPartnered(accepting));
                    }
                    if inviter_record.is_linked() {
                        return Err(DirectoryError::AlreadyPartnered(inviter));
                    }

                    accepting_record.withdraw_invitation(inviter, &*clock);
                    accepting_record.link_to(inviter, &*clock)?;
                    inviter_record.link_to(accepting, &*clock)?;

                    persist_account(tx, &accepting_record)?;
                    persist_account(tx, &inviter_record)?;
                    Ok(LinkedAccounts {
                        initiator: accepting_record,
                        counterpart: inviter_record,
                    })
                })
            })
            .await?;

        self.publish(&linked.initiator);
        self.publish(&linked.counterpart);
        Ok(linked)
    }

    async fn unlink_partners(
        &self,
        leaving: AccountId,
        partner: AccountId,
    ) -> DirectoryResult<LinkedAccounts> {
        let clock = Arc::clone(&self.clock);
        let unlinked = self
            .run_blocking(move |connection| {
                connection.transaction::<_, DirectoryError, _>(|tx| {
                    let (mut leaving_record, mut partner_record) = lock_pair(tx, leaving, partner)?;

                    leaving_record.unlink_from(partner, &*clock)?;
                    partner_record.unlink_from(leaving, &*clock)?;

                    persist_account(tx, &leaving_record)?;
                    persist_account(tx, &partner_record)?;
                    Ok(LinkedAccounts {
                        initiator: leaving_record,
                        counterpart: partner_record,
                    })
                })
            })
            .await?;

        self.publish(&unlinked.initiator);
        self.publish(&unlinked.counterpart);
        Ok(unlinked)
    }

    fn subscribe(&self) -> broadcast::Receiver<AccountEvent> {
        self.events.subscribe()
    }
}

/// Locks two account rows in id order so concurrent pairings cannot
/// deadlock, returning them in argument order.
fn lock_pair(
    connection: &mut PgConnection,
    first: AccountId,
    second: AccountId,
) -> DirectoryResult<(Account, Account)> {
    if first.into_inner() <= second.into_inner() {
        let first_record = lock_account(connection, first)?;
        let second_record = lock_account(connection, second)?;
        Ok((first_record, second_record))
    } else {
        let second_record = lock_account(connection, second)?;
        let first_record = lock_account(connection, first)?;
        Ok((first_record, second_record))
    }
}

fn lock_account(connection: &mut PgConnection, id: AccountId) -> DirectoryResult<Account> {
    let row = accounts::table
        .filter(accounts::id.eq(id.into_inner()))
        .for_update()
        .select(AccountRow::as_select())
        .first::<AccountRow>(connection)
        .optional()
        .map_err(DirectoryError::persistence)?
        .ok_or(DirectoryError::NotFound(id))?;
    row_to_account(row)
}

fn persist_account(connection: &mut PgConnection, account: &Account) -> DirectoryResult<usize> {
    let invitations =
        serde_json::to_value(account.invitations()).map_err(DirectoryError::persistence)?;
    let profile = serde_json::to_value(account.profile()).map_err(DirectoryError::persistence)?;

    diesel::update(accounts::table.filter(accounts::id.eq(account.id().into_inner())))
        .set((
            accounts::email.eq(account.email().as_str().to_owned()),
            accounts::first_name.eq(account.first_name().to_owned()),
            accounts::last_name.eq(account.last_name().to_owned()),
            accounts::role.eq(account.role().as_str().to_owned()),
            accounts::partner_id.eq(account.partner_id().map(AccountId::into_inner)),
            accounts::invitations.eq(invitations),
            accounts::profile.eq(profile),
            accounts::updated_at.eq(account.updated_at()),
        ))
        .execute(connection)
        .map_err(DirectoryError::persistence)
}

fn to_new_row(account: &Account) -> DirectoryResult<NewAccountRow> {
    let invitations =
        serde_json::to_value(account.invitations()).map_err(DirectoryError::persistence)?;
    let profile = serde_json::to_value(account.profile()).map_err(DirectoryError::persistence)?;

    Ok(NewAccountRow {
        id: account.id().into_inner(),
        email: account.email().as_str().to_owned(),
        first_name: account.first_name().to_owned(),
        last_name: account.last_name().to_owned(),
        role: account.role().as_str().to_owned(),
        partner_id: account.partner_id().map(AccountId::into_inner),
        invitations,
        profile,
        created_at: account.created_at(),
        updated_at: account.updated_at(),
    })
}

fn row_to_account(row: AccountRow) -> DirectoryResult<Account> {
    let AccountRow {
        id,
        email,
        first_name,
        last_name,
        role: persisted_role,
        partner_id,
        invitations: persisted_invitations,
        profile: persisted_profile,
        created_at,
        updated_at,
    } = row;

    let email = EmailAddress::new(email)?;
    let role =
        PartnerRole::try_from(persisted_role.as_str()).map_err(DirectoryError::persistence)?;
    let invitations = serde_json::from_value::<Vec<AccountId>>(persisted_invitations)
        .map_err(DirectoryError::persistence)?;
    let profile = serde_json::from_value::<AccountProfile>(persisted_profile)
        .map_err(DirectoryError::persistence)?;

    let data = PersistedAccountData {
        id: AccountId::from_uuid(id),
        email,
        first_name,
        last_name,
        role,
        partner_id: partner_id.map(AccountId::from_uuid),
        invitations,
        profile,
        created_at,
        updated_at,
    };
    Ok(Account::from_persisted(data))
}

fn is_email_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == "accounts_email_key")
}
