//! Account management and passwordless authentication for Marquee.
//!
//! This crate owns the `accounts` table, the one-time confirmation-code
//! protocol, and access-token minting. All collaborators (connection
//! pool, token keys, mailer) are injected explicitly.

pub mod account;
pub mod auth;
pub mod error;
pub mod store;

pub use account::Account;
pub use auth::{AuthState, Claims, CodeAuth, Mailer, MailerConfig, TokenKeys};
pub use error::{Result as UserResult, UserError};
pub use store::AccountStore;
