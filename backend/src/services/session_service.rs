//! Server-side session lifecycle.
//!
//! Sessions are created only by the authenticator, read by the session guard and
//! destroyed by logout or expiry. Each successful load slides the expiry forward by the
//! configured TTL.

use crate::auth::models::Session;
use crate::repositories::session_repository::SessionRepository;
use crate::utils::generate_random_string;
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

pub const SESSION_COOKIE: &str = "console_session";
const SESSION_ID_LENGTH: usize = 64;

pub struct SessionService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    ttl_seconds: i64,
}

impl<'a> SessionService<'a> {
    pub fn new(pool: &'a SqlitePool, ttl_seconds: u64) -> Self {
        Self {
            pool,
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX / 2),
        }
    }

    fn expiry_from(&self, now: i64) -> i64 {
        now.saturating_add(self.ttl_seconds)
    }

    /// Persists `session` under a fresh opaque id and returns that id.
    pub async fn create(&self, session: &Session) -> Result<String> {
        let id = generate_random_string(SESSION_ID_LENGTH);
        let data = serde_json::to_string(session).context("Failed to serialize session")?;
        let now = Utc::now().timestamp();

        SessionRepository::new(self.pool)
            .insert(&id, session.account_id, &data, now, self.expiry_from(now))
            .await?;

        debug!(account_id = session.account_id, "Session created");
        Ok(id)
    }

    /// Loads a live session. Expired or unreadable rows are deleted and reported as absent.
    pub async fn load(&self, id: &str) -> Result<Option<Session>> {
        let repo = SessionRepository::new(self.pool);
        let Some(row) = repo.find(id).await? else {
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        if row.expires_at <= now {
            debug!(account_id = row.account_id, "Session expired");
            repo.delete(id).await?;
            return Ok(None);
        }

        let session = match serde_json::from_str::<Session>(&row.data) {
            Ok(session) => session,
            Err(e) => {
                warn!(account_id = row.account_id, "Discarding unreadable session: {}", e);
                repo.delete(id).await?;
                return Ok(None);
            }
        };

        repo.touch(id, self.expiry_from(now)).await?;
        Ok(Some(session))
    }

    /// Returns the one-shot `login_success` flag and clears it in the store.
    pub async fn take_login_success(&self, id: &str, session: &mut Session) -> Result<bool> {
        if !session.login_success {
            return Ok(false);
        }

        session.login_success = false;
        let data = serde_json::to_string(session).context("Failed to serialize session")?;
        let now = Utc::now().timestamp();
        SessionRepository::new(self.pool)
            .update(id, &data, self.expiry_from(now))
            .await?;

        Ok(true)
    }

    /// Removes the session record. Destroying an unknown id is not an error.
    pub async fn destroy(&self, id: &str) -> Result<bool> {
        SessionRepository::new(self.pool).delete(id).await
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        SessionRepository::new(self.pool)
            .delete_expired(Utc::now().timestamp())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{migrated_pool, seed_account};

    fn sample_session(account_id: i64) -> Session {
        Session {
            account_id,
            name: "John Doe".to_string(),
            email: "john@example.org".to_string(),
            role: "Administrator".to_string(),
            avatar: "JD".to_string(),
            login_success: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let pool = migrated_pool().await;
        let account_id = seed_account(&pool, "john@example.org", "password", "Administrator").await;
        let service = SessionService::new(&pool, 3600);

        let id = service.create(&sample_session(account_id)).await.unwrap();
        assert_eq!(id.len(), SESSION_ID_LENGTH);

        let loaded = service.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded, sample_session(account_id));
        assert!(service.load("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_absent_and_removed() {
        let pool = migrated_pool().await;
        let account_id = seed_account(&pool, "john@example.org", "password", "Administrator").await;
        let service = SessionService::new(&pool, 0);

        let id = service.create(&sample_session(account_id)).await.unwrap();
        assert!(service.load(&id).await.unwrap().is_none());
        assert!(
            SessionRepository::new(&pool)
                .find(&id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_login_success_is_one_shot() {
        let pool = migrated_pool().await;
        let account_id = seed_account(&pool, "john@example.org", "password", "Administrator").await;
        let service = SessionService::new(&pool, 3600);
        let id = service.create(&sample_session(account_id)).await.unwrap();

        let mut session = service.load(&id).await.unwrap().unwrap();
        assert!(service.take_login_success(&id, &mut session).await.unwrap());

        let mut session = service.load(&id).await.unwrap().unwrap();
        assert!(!session.login_success);
        assert!(!service.take_login_success(&id, &mut session).await.unwrap());
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let pool = migrated_pool().await;
        let account_id = seed_account(&pool, "john@example.org", "password", "Administrator").await;
        let service = SessionService::new(&pool, 3600);
        let id = service.create(&sample_session(account_id)).await.unwrap();

        assert!(service.destroy(&id).await.unwrap());
        assert!(!service.destroy(&id).await.unwrap());
        assert!(service.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let pool = migrated_pool().await;
        let account_id = seed_account(&pool, "john@example.org", "password", "Administrator").await;

        let live = SessionService::new(&pool, 3600)
            .create(&sample_session(account_id))
            .await
            .unwrap();
        SessionService::new(&pool, 0)
            .create(&sample_session(account_id))
            .await
            .unwrap();

        let service = SessionService::new(&pool, 3600);
        assert_eq!(service.purge_expired().await.unwrap(), 1);
        assert!(service.load(&live).await.unwrap().is_some());
    }
}
