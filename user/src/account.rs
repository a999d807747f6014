//! Account record and its mapping to an authorization principal.

use authz::{Principal, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user account as stored in the database.
///
/// Accounts are auto-created the first time an email requests a
/// confirmation code; they start inactive with role `user` and become
/// active on the first successful code redemption.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// ULID string.
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_staff: bool,
    pub is_active: bool,
    /// Current one-time confirmation code (UUID v4), overwritten on
    /// every code request.
    pub confirmation_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// The authorization principal this account acts as.
    pub fn principal(&self) -> Principal {
        Principal::known(self.id.clone(), self.role, self.is_staff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(role: Role, is_staff: bool) -> Account {
        Account {
            id: "01J0000000000000000000TEST".to_string(),
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role,
            is_staff,
            is_active: true,
            confirmation_code: "c0ffee00-0000-4000-8000-000000000000".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn principal_carries_role_and_staff_flag() {
        let p = account(Role::Moderator, false).principal();
        assert!(p.is_elevated());
        assert!(!p.is_admin());

        let p = account(Role::User, true).principal();
        assert!(p.is_admin());
    }
}
