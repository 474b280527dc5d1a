//! Database repository for the credential store.
//!
//! Provides lookups by email and by username, the best-effort updates issued after a
//! successful login, and account provisioning. The optional `username` and
//! `last_login` columns are discovered once through [`SchemaCapabilities`].

use crate::database::models::{Account, NewAccount};
use anyhow::{Result, ensure};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// Optional `users` columns present in the connected schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaCapabilities {
    pub has_username: bool,
    pub has_last_login: bool,
}

impl SchemaCapabilities {
    /// Introspects the `users` table. Run once at startup, not per request.
    ///
    /// # Errors
    /// Fails when the `users` table does not exist.
    pub async fn discover(pool: &SqlitePool) -> Result<Self> {
        let rows = sqlx::query("PRAGMA table_info(users)")
            .fetch_all(pool)
            .await?;
        ensure!(!rows.is_empty(), "users table not found");

        let mut capabilities = SchemaCapabilities::default();
        for row in rows {
            let name: String = row.try_get("name")?;
            match name.as_str() {
                "username" => capabilities.has_username = true,
                "last_login" => capabilities.has_last_login = true,
                _ => {}
            }
        }

        Ok(capabilities)
    }
}

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
    capabilities: SchemaCapabilities,
}

impl<'a> AccountRepository<'a> {
    /// Creates a new AccountRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    /// * `capabilities` - Optional columns discovered at startup
    pub fn new(pool: &'a SqlitePool, capabilities: SchemaCapabilities) -> Self {
        Self { pool, capabilities }
    }

    /// Column list for `Account`, with absent optional columns read as `NULL`.
    fn select_columns(&self) -> String {
        let username = if self.capabilities.has_username {
            "username"
        } else {
            "NULL AS username"
        };
        let last_login = if self.capabilities.has_last_login {
            "last_login"
        } else {
            "NULL AS last_login"
        };

        format!(
            "id, email, {username}, password_hash, first_name, last_name, role, \
             avatar, {last_login}"
        )
    }

    /// Retrieves an account by email.
    ///
    /// # Returns
    /// `Some(Account)` if found, `None` otherwise
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?", self.select_columns());
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(account)
    }

    /// Retrieves an account by username.
    ///
    /// Always `None` when the schema has no username column. Blank usernames never match.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        if !self.capabilities.has_username || username.trim().is_empty() {
            return Ok(None);
        }

        let sql = format!(
            "SELECT {} FROM users WHERE username = ? AND TRIM(username) <> ''",
            self.select_columns()
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(account)
    }

    /// Replaces the stored password hash.
    pub async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Stamps `last_login` with the current time.
    ///
    /// # Returns
    /// `false` without touching the store when the column does not exist
    pub async fn touch_last_login(&self, id: i64) -> Result<bool> {
        if !self.capabilities.has_last_login {
            return Ok(false);
        }

        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(true)
    }

    /// Inserts a new account whose password is already hashed.
    ///
    /// # Returns
    /// The id of the new account
    pub async fn create_account(&self, account: &NewAccount) -> Result<i64> {
        let result = if self.capabilities.has_username {
            sqlx::query(
                "INSERT INTO users (email, username, password_hash, first_name, last_name, role) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&account.email)
            .bind(account.username.as_deref())
            .bind(&account.password_hash)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.role)
            .execute(self.pool)
            .await?
        } else {
            sqlx::query(
                "INSERT INTO users (email, password_hash, first_name, last_name, role) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.role)
            .execute(self.pool)
            .await?
        };

        Ok(result.last_insert_rowid())
    }
}
