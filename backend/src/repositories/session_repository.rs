//! Database repository for server-side sessions.
//!
//! Rows are keyed by the opaque session id delivered in the session cookie. The
//! payload is stored as JSON; expiry is a unix timestamp.

use crate::database::models::SessionRow;
use anyhow::Result;
use sqlx::SqlitePool;

pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        id: &str,
        account_id: i64,
        data: &str,
        created_at: i64,
        expires_at: i64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, account_id, data, created_at, expires_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(account_id)
        .bind(data)
        .bind(created_at)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<SessionRow>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT account_id, data, expires_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Replaces the payload and pushes the expiry forward.
    pub async fn update(&self, id: &str, data: &str, expires_at: i64) -> Result<()> {
        sqlx::query("UPDATE sessions SET data = ?, expires_at = ? WHERE id = ?")
            .bind(data)
            .bind(expires_at)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    pub async fn touch(&self, id: &str, expires_at: i64) -> Result<()> {
        sqlx::query("UPDATE sessions SET expires_at = ? WHERE id = ?")
            .bind(expires_at)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Deletes a session.
    ///
    /// # Returns
    /// `true` if a row was removed
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every session whose expiry is at or before `now`.
    pub async fn delete_expired(&self, now: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
