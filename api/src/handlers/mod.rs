pub mod accounts;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod genres;
pub mod health;
pub mod reviews;
pub mod titles;

use user::{Account, AuthState};

use crate::error::{ApiError, ApiResult};

/// Resolve the authenticated account or fail with 401.
pub(crate) fn require_account(auth: &AuthState) -> ApiResult<&Account> {
    auth.account().ok_or(ApiError::Unauthorized)
}
