//! SQLite-backed account store.
//!
//! The store is handed its connection pool at construction; nothing in
//! this crate reaches for global state. Per-row updates are atomic in
//! SQLite, which is all the code/active-flag pair needs (last writer
//! wins on the code, setting active twice is harmless).

use sqlx::SqlitePool;
use tracing::{debug, info};
use ulid::Ulid;
use uuid::Uuid;

use crate::account::Account;
use crate::error::Result;

#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the accounts table if it does not exist.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running account store migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                bio TEXT NOT NULL DEFAULT '',
                role TEXT NOT NULL DEFAULT 'user',
                is_staff BOOLEAN NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT 0,
                confirmation_code TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_accounts_email ON accounts (email)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    /// Look up the account matching the exact (email, code) pair.
    ///
    /// This is the whole credential check for code redemption: no match
    /// means invalid credentials, with no hint which half was wrong.
    pub async fn find_by_email_and_code(&self, email: &str, code: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE email = ? AND confirmation_code = ?",
        )
        .bind(email)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    /// Fetch the account for `email`, creating an inactive one with a
    /// fresh confirmation code when the email is new. Returns the
    /// account and whether it was just created.
    pub async fn get_or_create(&self, email: &str) -> Result<(Account, bool)> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok((existing, false));
        }

        let now = chrono::Utc::now();
        let account = Account {
            id: Ulid::new().to_string(),
            username: self.available_username(email).await?,
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role: authz::Role::User,
            is_staff: false,
            is_active: false,
            confirmation_code: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
        };

        self.insert(&account).await?;
        info!("Created provisional account for new email (id={})", account.id);
        Ok((account, true))
    }

    pub async fn insert(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, username, email, first_name, last_name, bio,
                role, is_staff, is_active, confirmation_code,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.bio)
        .bind(account.role.as_str())
        .bind(account.is_staff)
        .bind(account.is_active)
        .bind(&account.confirmation_code)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persist the mutable profile fields of an account.
    pub async fn update(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET username = ?, email = ?, first_name = ?, last_name = ?,
                bio = ?, role = ?, is_staff = ?, is_active = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.bio)
        .bind(account.role.as_str())
        .bind(account.is_staff)
        .bind(account.is_active)
        .bind(chrono::Utc::now())
        .bind(&account.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Overwrite the stored confirmation code. The previous code stops
    /// matching immediately.
    pub async fn set_confirmation_code(&self, id: &str, code: &str) -> Result<()> {
        sqlx::query("UPDATE accounts SET confirmation_code = ?, updated_at = ? WHERE id = ?")
            .bind(code)
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Flip the account to active. Idempotent; there is no deactivation
    /// path.
    pub async fn activate(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE accounts SET is_active = 1, updated_at = ? WHERE id = ?")
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_by_username(&self, username: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List accounts ordered by id, optionally filtered by a username
    /// substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Account>> {
        let accounts = match search {
            Some(needle) => {
                sqlx::query_as::<_, Account>(
                    r#"
                    SELECT * FROM accounts
                    WHERE username LIKE '%' || ? || '%'
                    ORDER BY id
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(needle)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Account>(
                    "SELECT * FROM accounts ORDER BY id LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(accounts)
    }

    /// Derive a free username from the email local part, suffixing a
    /// counter when taken.
    async fn available_username(&self, email: &str) -> Result<String> {
        let base: String = email
            .split('@')
            .next()
            .unwrap_or(email)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        let base = if base.is_empty() { "user".to_string() } else { base };

        if self.find_by_username(&base).await?.is_none() {
            return Ok(base);
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.find_by_username(&candidate).await?.is_none() {
                debug!("Username {} taken, using {}", base, candidate);
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> AccountStore {
        // A single connection keeps the in-memory database alive and
        // shared for the whole test.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = AccountStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn get_or_create_provisions_inactive_account() {
        let store = store().await;

        let (account, created) = store.get_or_create("ada@example.com").await.unwrap();
        assert!(created);
        assert!(!account.is_active);
        assert_eq!(account.role, authz::Role::User);
        assert_eq!(account.username, "ada");
        assert!(!account.confirmation_code.is_empty());

        let (again, created) = store.get_or_create("ada@example.com").await.unwrap();
        assert!(!created);
        assert_eq!(again.id, account.id);
    }

    #[tokio::test]
    async fn username_collisions_get_a_suffix() {
        let store = store().await;
        let (a, _) = store.get_or_create("sam@one.example").await.unwrap();
        let (b, _) = store.get_or_create("sam@two.example").await.unwrap();
        assert_eq!(a.username, "sam");
        assert_eq!(b.username, "sam2");
    }

    #[tokio::test]
    async fn code_overwrite_invalidates_old_code() {
        let store = store().await;
        let (account, _) = store.get_or_create("ada@example.com").await.unwrap();
        let old_code = account.confirmation_code.clone();

        let new_code = Uuid::new_v4().to_string();
        store.set_confirmation_code(&account.id, &new_code).await.unwrap();

        assert!(store
            .find_by_email_and_code("ada@example.com", &old_code)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_email_and_code("ada@example.com", &new_code)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn activate_is_idempotent() {
        let store = store().await;
        let (account, _) = store.get_or_create("ada@example.com").await.unwrap();

        store.activate(&account.id).await.unwrap();
        store.activate(&account.id).await.unwrap();

        let fetched = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn list_filters_by_username_substring() {
        let store = store().await;
        store.get_or_create("alice@example.com").await.unwrap();
        store.get_or_create("bob@example.com").await.unwrap();

        let hits = store.list(Some("ali"), 20, 0).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "alice");

        let all = store.list(None, 20, 0).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
