//! In-memory auth provider for tests and local use.

use crate::account::domain::AccountId;
use crate::session::ports::AuthProvider;
use std::sync::RwLock;

/// Auth provider holding its authentication state in memory.
#[derive(Debug, Default)]
pub struct StaticAuthProvider {
    current: RwLock<Option<AccountId>>,
}

impl StaticAuthProvider {
    /// Creates a provider with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with the given account signed in.
    #[must_use]
    pub fn signed_in(account_id: AccountId) -> Self {
        Self {
            current: RwLock::new(Some(account_id)),
        }
    }

    /// Signs the given account in, replacing any previous state.
    pub fn sign_in(&self, account_id: AccountId) {
        if let Ok(mut current) = self.current.write() {
            *current = Some(account_id);
        }
    }
}

impl AuthProvider for StaticAuthProvider {
    fn current_account_id(&self) -> Option<AccountId> {
        self.current.read().ok().and_then(|current| *current)
    }

    fn sign_out(&self) {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
    }
}
