//! Auth-provider port consumed at session start and sign-out.

use crate::account::domain::AccountId;
use thiserror::Error;

/// Authentication contract backed by the external identity provider.
///
/// The provider knows at most one authenticated account at a time.
pub trait AuthProvider: Send + Sync {
    /// Returns the currently authenticated account, if any.
    fn current_account_id(&self) -> Option<AccountId>;

    /// Ends the provider-side authentication state.
    fn sign_out(&self);
}

/// Errors returned while establishing a session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No account is authenticated with the provider.
    #[error("no authenticated account")]
    NotAuthenticated,
}
