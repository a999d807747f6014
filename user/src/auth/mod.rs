//! Authentication for the Marquee service:
//! - one-time confirmation codes delivered by email
//! - stateless JWT bearer tokens minted on redemption

pub mod codes;
pub mod mailer;
pub mod token;

pub use codes::CodeAuth;
pub use mailer::{Mailer, MailerConfig};
pub use token::{Claims, TokenKeys};

use crate::account::Account;

/// Authentication state resolved from a request.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// A valid token mapped to this account.
    Authenticated(Account),
    /// No token, or an invalid/expired one.
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            AuthState::Authenticated(account) => Some(account),
            AuthState::Unauthenticated => None,
        }
    }

    /// The authorization principal for this request.
    pub fn principal(&self) -> authz::Principal {
        match self {
            AuthState::Authenticated(account) => account.principal(),
            AuthState::Unauthenticated => authz::Principal::Anonymous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_state_is_anonymous() {
        let state = AuthState::Unauthenticated;
        assert!(!state.is_authenticated());
        assert!(state.account().is_none());
        assert_eq!(state.principal(), authz::Principal::Anonymous);
    }
}
