//! One-time confirmation-code authentication.
//!
//! The flow is passwordless: a caller submits an email, receives a
//! random UUID code out of band, and exchanges the (email, code) pair
//! for a bearer token. Accounts are auto-created on first sight,
//! inactive until the first successful redemption.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::account::Account;
use crate::auth::mailer::Mailer;
use crate::auth::token::TokenKeys;
use crate::error::{Result, UserError};
use crate::store::AccountStore;

/// Confirmation-code issue/redeem service.
///
/// Collaborators are injected at construction. The mailer is optional
/// so tests (and codeless deployments) can run without SMTP.
#[derive(Clone)]
pub struct CodeAuth {
    store: AccountStore,
    tokens: TokenKeys,
    mailer: Option<Mailer>,
}

impl CodeAuth {
    pub fn new(store: AccountStore, tokens: TokenKeys, mailer: Option<Mailer>) -> Self {
        Self { store, tokens, mailer }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    pub fn tokens(&self) -> &TokenKeys {
        &self.tokens
    }

    /// Issue a confirmation code for `email` and dispatch it by mail.
    ///
    /// Always succeeds from the caller's point of view: the response
    /// never reveals whether the email already had an account, and a
    /// failed send is logged but not surfaced (best-effort delivery).
    /// Each call overwrites the stored code; earlier codes stop
    /// matching.
    pub async fn request_code(&self, email: &str) -> Result<Account> {
        let (mut account, created) = self.store.get_or_create(email).await?;

        if !created {
            // Re-issue: rotate the code for the existing account. The
            // active flag is left alone, there is no deactivation path.
            let code = Uuid::new_v4().to_string();
            self.store.set_confirmation_code(&account.id, &code).await?;
            account.confirmation_code = code;
        }

        info!("Confirmation code issued for account {}", account.id);

        if let Some(mailer) = &self.mailer {
            // Fire and forget: the send result is deliberately ignored
            // beyond logging, matching the always-OK contract of this
            // endpoint.
            let mailer = mailer.clone();
            let to = account.email.clone();
            let code = account.confirmation_code.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer.send_confirmation_code(&to, &code).await {
                    error!("Failed to send confirmation code: {}", e);
                }
            });
        }

        Ok(account)
    }

    /// Exchange an (email, code) pair for an access token, activating
    /// the account.
    ///
    /// Codes do not expire and are not consumed on redemption: the same
    /// code keeps working until the next [`CodeAuth::request_code`]
    /// rotates it. A leaked code is therefore replayable until then,
    /// which existing clients depend on.
    pub async fn redeem_code(&self, email: &str, code: &str) -> Result<String> {
        let Some(account) = self.store.find_by_email_and_code(email, code).await? else {
            warn!("Code redemption failed for email: {}", email);
            return Err(UserError::InvalidCredentials);
        };

        self.store.activate(&account.id).await?;
        let token = self.tokens.mint(&account.id)?;

        info!("Account {} activated and token issued", account.id);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> CodeAuth {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = AccountStore::new(pool);
        store.migrate().await.unwrap();
        CodeAuth::new(store, TokenKeys::from_secret(b"test-secret", 60), None)
    }

    #[tokio::test]
    async fn request_then_redeem_activates_and_yields_token() {
        let auth = service().await;

        let account = auth.request_code("a@b.com").await.unwrap();
        assert!(!account.is_active);

        let token = auth
            .redeem_code("a@b.com", &account.confirmation_code)
            .await
            .unwrap();
        assert!(!token.is_empty());

        let claims = auth.tokens().verify(&token).unwrap();
        assert_eq!(claims.sub, account.id);

        let fetched = auth.store().find_by_id(&account.id).await.unwrap().unwrap();
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn wrong_code_fails_and_leaves_account_inactive() {
        let auth = service().await;
        let account = auth.request_code("a@b.com").await.unwrap();

        let result = auth
            .redeem_code("a@b.com", &Uuid::new_v4().to_string())
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));

        let fetched = auth.store().find_by_id(&account.id).await.unwrap().unwrap();
        assert!(!fetched.is_active);
    }

    #[tokio::test]
    async fn unknown_email_fails_with_invalid_credentials() {
        let auth = service().await;
        let result = auth
            .redeem_code("nobody@example.com", &Uuid::new_v4().to_string())
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn reissue_rotates_the_code() {
        let auth = service().await;
        let first = auth.request_code("a@b.com").await.unwrap();
        let second = auth.request_code("a@b.com").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.confirmation_code, second.confirmation_code);

        // Old code no longer matches, new one does.
        assert!(auth
            .redeem_code("a@b.com", &first.confirmation_code)
            .await
            .is_err());
        assert!(auth
            .redeem_code("a@b.com", &second.confirmation_code)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn redemption_is_not_single_use() {
        let auth = service().await;
        let account = auth.request_code("a@b.com").await.unwrap();

        // The same code redeems repeatedly until the next request_code.
        for _ in 0..3 {
            assert!(auth
                .redeem_code("a@b.com", &account.confirmation_code)
                .await
                .is_ok());
        }
    }

    #[tokio::test]
    async fn reissue_for_active_account_keeps_it_active() {
        let auth = service().await;
        let account = auth.request_code("a@b.com").await.unwrap();
        auth.redeem_code("a@b.com", &account.confirmation_code)
            .await
            .unwrap();

        auth.request_code("a@b.com").await.unwrap();
        let fetched = auth.store().find_by_id(&account.id).await.unwrap().unwrap();
        assert!(fetched.is_active);
    }
}
