//! Explicit session context carried into every workflow call.

use super::ports::{AuthProvider, SessionError};
use crate::account::domain::AccountId;

/// The authenticated account's context for one signed-in span.
///
/// Created at sign-in, passed by reference into workflow services, and
/// consumed by [`Session::end`] at sign-out. Keeping the context an explicit
/// value (rather than ambient state) pins its lifecycle to the sign-in span
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    account_id: AccountId,
}

impl Session {
    /// Establishes a session from the provider's authentication state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] when no account is
    /// signed in.
    pub fn begin(provider: &impl AuthProvider) -> Result<Self, SessionError> {
        provider
            .current_account_id()
            .map(|account_id| Self { account_id })
            .ok_or(SessionError::NotAuthenticated)
    }

    /// Creates a session for a known account without consulting a provider.
    ///
    /// Useful where the account is already authenticated out of band, and
    /// in tests.
    #[must_use]
    pub const fn for_account(account_id: AccountId) -> Self {
        Self { account_id }
    }

    /// Returns the authenticated account.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Ends the session and signs the account out of the provider.
    pub fn end(self, provider: &impl AuthProvider) {
        provider.sign_out();
    }
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "Test code uses expect for assertion clarity"
    )]

    use super::Session;
    use crate::account::domain::AccountId;
    use crate::session::adapters::StaticAuthProvider;
    use crate::session::ports::{AuthProvider, SessionError};

    mockall::mock! {
        Provider {}

        impl AuthProvider for Provider {
            fn current_account_id(&self) -> Option<AccountId>;
            fn sign_out(&self);
        }
    }

    #[test]
    fn begin_consults_the_provider_once() {
        let account_id = AccountId::new();
        let mut provider = MockProvider::new();
        provider
            .expect_current_account_id()
            .times(1)
            .return_const(Some(account_id));

        let session = Session::begin(&provider).expect("session established");
        assert_eq!(session.account_id(), account_id);
    }

    #[test]
    fn begin_requires_an_authenticated_account() {
        let provider = StaticAuthProvider::new();
        let result = Session::begin(&provider);
        assert_eq!(result.expect_err("nobody signed in"), SessionError::NotAuthenticated);
    }

    #[test]
    fn begin_carries_the_signed_in_account() {
        let account_id = AccountId::new();
        let provider = StaticAuthProvider::signed_in(account_id);
        let session = Session::begin(&provider).expect("session established");
        assert_eq!(session.account_id(), account_id);
    }

    #[test]
    fn end_signs_out_of_the_provider() {
        let account_id = AccountId::new();
        let provider = StaticAuthProvider::signed_in(account_id);
        let session = Session::begin(&provider).expect("session established");

        session.end(&provider);
        assert!(provider.current_account_id().is_none());
        assert_eq!(
            Session::begin(&provider).expect_err("signed out"),
            SessionError::NotAuthenticated
        );
    }

    #[test]
    fn sign_in_replaces_previous_state() {
        let provider = StaticAuthProvider::new();
        let first = AccountId::new();
        let second = AccountId::new();

        provider.sign_in(first);
        provider.sign_in(second);
        assert_eq!(provider.current_account_id(), Some(second));
    }
}
