//! Service layer for the partner-linking and invitation workflow.

use crate::account::{
    domain::{Account, AccountDomainError, AccountId, AccountProfile, EmailAddress, PartnerRole},
    ports::{Directory, DirectoryError, LinkedAccounts},
};
use crate::notification::{
    domain::{Notification, NotificationDomainError, NotificationKind},
    ports::{NotificationStore, NotificationStoreError},
    services::compose,
};
use crate::session::Session;
use crate::task::ports::{TaskStore, TaskStoreError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// One pending invitation as shown to its recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationView {
    /// Account that proposed the link.
    pub sender_id: AccountId,
    /// Sender's first name.
    pub first_name: String,
    /// Sender's last name.
    pub last_name: String,
}

/// The recipient's invitation list plus transient advisories for entries
/// that were pruned during the read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvitationListing {
    /// Live invitations in stored order.
    pub invitations: Vec<InvitationView>,
    /// One message per invitation dropped by cleanup.
    pub advisories: Vec<String>,
}

/// Outcome of a partnership dissolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DissolutionOutcome {
    /// The account the session account was linked to.
    pub former_partner_id: AccountId,
    /// How many exchanged tasks the cascade removed.
    pub removed_tasks: usize,
}

/// Service-level errors for linking operations.
#[derive(Debug, Error)]
pub enum LinkingError {
    /// The partner email field was empty.
    #[error("partner email must not be empty")]
    EmptyPartnerEmail,

    /// The partner email is the session account's own address.
    #[error("cannot send a partner invitation to your own address")]
    OwnEmail,

    /// The account already has a partner.
    #[error("account {0} is already linked to a partner")]
    AlreadyPartnered(AccountId),

    /// No account uses the given email address.
    #[error("no account is registered under {0}")]
    EmailNotFound(String),

    /// Both accounts hold the same role.
    #[error("a partner link requires opposite roles; both accounts are {0}")]
    SameRole(PartnerRole),

    /// The candidate already holds an invitation from the session account.
    #[error("an invitation to this account is already pending")]
    DuplicateInvitation,

    /// The account does not exist.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// The operation requires a linked partner.
    #[error("no partner is linked to this account")]
    NoPartnerLinked,

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AccountDomainError),

    /// Directory operation failed.
    #[error(transparent)]
    Directory(DirectoryError),

    /// Task store operation failed during the dissolution cascade.
    #[error(transparent)]
    Tasks(#[from] TaskStoreError),

    /// Notification store operation failed during fan-out.
    #[error(transparent)]
    Notifications(#[from] NotificationStoreError),

    /// Notification message composition failed.
    #[error(transparent)]
    Message(#[from] NotificationDomainError),
}

/// Result type for linking service operations.
pub type LinkingResult<T> = Result<T, LinkingError>;

/// Maps directory failures onto the workflow's own vocabulary.
fn linking_error(err: DirectoryError) -> LinkingError {
    match err {
        DirectoryError::NotFound(id) => LinkingError::AccountNotFound(id),
        DirectoryError::AlreadyPartnered(id) => LinkingError::AlreadyPartnered(id),
        DirectoryError::Domain(AccountDomainError::DuplicateInvitation { .. }) => {
            LinkingError::DuplicateInvitation
        }
        DirectoryError::Domain(domain) => LinkingError::Domain(domain),
        other => LinkingError::Directory(other),
    }
}

/// Partner-linking orchestration service.
///
/// Reads and writes account records through the directory, and fans out to
/// the task store (dissolution cascade) and the notification store
/// (rejection and cascade notices).
#[derive(Clone)]
pub struct PartnerLinkingService<D, T, N, C>
where
    D: Directory,
    T: TaskStore,
    N: NotificationStore,
    C: Clock + Send + Sync,
{
    directory: Arc<D>,
    tasks: Arc<T>,
    notifications: Arc<N>,
    clock: Arc<C>,
}

impl<D, T, N, C> PartnerLinkingService<D, T, N, C>
where
    D: Directory,
    T: TaskStore,
    N: NotificationStore,
    C: Clock + Send + Sync,
{
    /// Creates a new linking service.
    #[must_use]
    pub const fn new(
        directory: Arc<D>,
        tasks: Arc<T>,
        notifications: Arc<N>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            directory,
            tasks,
            notifications,
            clock,
        }
    }

    /// Proposes a partnership to the account registered under
    /// `partner_email`.
    ///
    /// On success the session account's id is appended to the candidate's
    /// invitation set; the session account's own record is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LinkingError::EmptyPartnerEmail`] or
    /// [`LinkingError::OwnEmail`] for bad input,
    /// [`LinkingError::AlreadyPartnered`] when the session account has a
    /// partner, [`LinkingError::EmailNotFound`] when no account uses the
    /// address, [`LinkingError::SameRole`] when the roles match, and
    /// [`LinkingError::DuplicateInvitation`] when an invitation is already
    /// pending.
    pub async fn propose_link(&self, session: &Session, partner_email: &str) -> LinkingResult<()> {
        let trimmed = partner_email.trim();
        if trimmed.is_empty() {
            return Err(LinkingError::EmptyPartnerEmail);
        }

        let me = self.require_account(session.account_id()).await?;
        if me.is_linked() {
            return Err(LinkingError::AlreadyPartnered(me.id()));
        }

        let email = EmailAddress::new(trimmed)?;
        if email == *me.email() {
            return Err(LinkingError::OwnEmail);
        }

        let candidate = self
            .directory
            .find_by_email(&email)
            .await
            .map_err(linking_error)?
            .ok_or_else(|| LinkingError::EmailNotFound(email.to_string()))?;

        if candidate.role() == me.role() {
            return Err(LinkingError::SameRole(me.role()));
        }
        if candidate.has_invitation_from(me.id()) {
            return Err(LinkingError::DuplicateInvitation);
        }

        // The append re-checks the duplicate guard under the directory's
        // own lock, closing the window between the read above and the write.
        self.directory
            .append_invitation(candidate.id(), me.id())
            .await
            .map_err(linking_error)?;
        debug!(candidate = %candidate.id(), "partner invitation recorded");
        Ok(())
    }

    /// Lists the session account's pending invitations in stored order.
    ///
    /// Senders that gained a partner since inviting are dropped from the
    /// stored set during the read and reported as advisories instead.
    ///
    /// # Errors
    ///
    /// Returns [`LinkingError::AccountNotFound`] when the session account is
    /// missing, or a directory error when a lookup or the cleanup write
    /// fails.
    pub async fn list_invitations(&self, session: &Session) -> LinkingResult<InvitationListing> {
        let me = self.require_account(session.account_id()).await?;
        let mut listing = InvitationListing::default();

        for sender_id in me.invitations() {
            match self
                .directory
                .find_by_id(*sender_id)
                .await
                .map_err(linking_error)?
            {
                Some(sender) if sender.is_linked() => {
                    self.directory
                        .remove_invitation(me.id(), sender.id())
                        .await
                        .map_err(linking_error)?;
                    debug!(sender = %sender.id(), "pruned invitation from linked sender");
                    listing.advisories.push(format!(
                        "{} {} is already linked to a partner; the invitation was removed.",
                        sender.first_name(),
                        sender.last_name()
                    ));
                }
                Some(sender) => listing.invitations.push(InvitationView {
                    sender_id: sender.id(),
                    first_name: sender.first_name().to_owned(),
                    last_name: sender.last_name().to_owned(),
                }),
                None => {
                    self.directory
                        .remove_invitation(me.id(), *sender_id)
                        .await
                        .map_err(linking_error)?;
                    debug!(sender = %sender_id, "pruned invitation from missing sender");
                    listing
                        .advisories
                        .push("An invitation from a deleted account was removed.".to_owned());
                }
            }
        }
        Ok(listing)
    }

    /// Accepts a pending invitation, establishing the reciprocal link.
    ///
    /// The link, the reverse link, and the invitation removal are applied
    /// as one atomic directory operation; a conflict on either side rejects
    /// the whole acceptance.
    ///
    /// # Errors
    ///
    /// Returns [`LinkingError::AccountNotFound`] when either account is
    /// missing, or [`LinkingError::AlreadyPartnered`] when either side
    /// gained a partner since the invitation was sent.
    pub async fn accept_invitation(
        &self,
        session: &Session,
        inviter_id: AccountId,
    ) -> LinkingResult<LinkedAccounts> {
        let linked = self
            .directory
            .link_partners(session.account_id(), inviter_id)
            .await
            .map_err(linking_error)?;
        info!(
            account = %linked.initiator.id(),
            partner = %linked.counterpart.id(),
            "partnership established"
        );
        Ok(linked)
    }

    /// Rejects a pending invitation and notifies the inviter.
    ///
    /// Only the session account's invitation set is touched; the inviter
    /// receives an invitation-kind notification with role-dependent
    /// wording.
    ///
    /// # Errors
    ///
    /// Returns [`LinkingError::AccountNotFound`] when the session account is
    /// missing, or a notification error when the fan-out write fails.
    pub async fn reject_invitation(
        &self,
        session: &Session,
        inviter_id: AccountId,
    ) -> LinkingResult<()> {
        let me = self
            .directory
            .remove_invitation(session.account_id(), inviter_id)
            .await
            .map_err(linking_error)?;

        let message = compose::invitation_rejected(&me)?;
        let notification =
            Notification::new(inviter_id, NotificationKind::Invitation, message, &*self.clock)?
                .with_related_id(me.id().into_inner());
        self.notifications.insert(&notification).await?;
        Ok(())
    }

    /// Dissolves the session account's partnership.
    ///
    /// Both partner links are cleared atomically; the tasks the two
    /// accounts created for each other are removed, each removal fanning
    /// out a task-deleted notification to the board the task sat on.
    ///
    /// # Errors
    ///
    /// Returns [`LinkingError::NoPartnerLinked`] when the session account
    /// has no partner, or the underlying directory, task store, or
    /// notification error when a write fails.
    pub async fn leave_partner(&self, session: &Session) -> LinkingResult<DissolutionOutcome> {
        let me = self.require_account(session.account_id()).await?;
        let partner_id = me.partner_id().ok_or(LinkingError::NoPartnerLinked)?;

        self.directory
            .unlink_partners(me.id(), partner_id)
            .await
            .map_err(linking_error)?;

        let removed = self
            .tasks
            .delete_exchanged_between(me.id(), partner_id)
            .await?;
        for task in &removed {
            let message = compose::task_removed(task.title())?;
            let notification = Notification::new(
                task.owner_id(),
                NotificationKind::TaskDeleted,
                message,
                &*self.clock,
            )?
            .with_related_id(task.id().into_inner())
            .with_task_title(task.title());
            self.notifications.insert(&notification).await?;
        }

        info!(
            account = %me.id(),
            former_partner = %partner_id,
            removed_tasks = removed.len(),
            "partnership dissolved"
        );
        Ok(DissolutionOutcome {
            former_partner_id: partner_id,
            removed_tasks: removed.len(),
        })
    }

    /// Replaces the session account's profile attributes.
    ///
    /// Names and role are not editable through this path.
    ///
    /// # Errors
    ///
    /// Returns [`LinkingError::AccountNotFound`] when the session account is
    /// missing, or a directory error when the write fails.
    pub async fn update_profile(
        &self,
        session: &Session,
        profile: AccountProfile,
    ) -> LinkingResult<Account> {
        let mut me = self.require_account(session.account_id()).await?;
        me.update_profile(profile, &*self.clock);
        self.directory.update(&me).await.map_err(linking_error)?;
        Ok(me)
    }

    async fn require_account(&self, id: AccountId) -> LinkingResult<Account> {
        self.directory
            .find_by_id(id)
            .await
            .map_err(linking_error)?
            .ok_or(LinkingError::AccountNotFound(id))
    }
}
