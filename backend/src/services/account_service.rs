//! Account provisioning.
//!
//! The console has no registration endpoint; accounts are created by operators. This
//! service covers the bootstrap account configured through the environment.

use crate::config::BootstrapAccount;
use crate::context::AppContext;
use crate::database::models::NewAccount;
use crate::repositories::account_repository::AccountRepository;
use anyhow::{Context, Result, anyhow};
use sqlx::SqlitePool;
use tracing::info;
use validator::Validate;

pub struct AccountService<'a> {
    pool: &'a SqlitePool,
    ctx: &'a AppContext,
}

impl<'a> AccountService<'a> {
    pub fn new(pool: &'a SqlitePool, ctx: &'a AppContext) -> Self {
        Self { pool, ctx }
    }

    /// Creates the bootstrap account unless an account with that email already exists.
    ///
    /// # Returns
    /// The id of the created account, `None` if it already existed
    pub async fn ensure_bootstrap_account(
        &self,
        bootstrap: &BootstrapAccount,
    ) -> Result<Option<i64>> {
        let repo = AccountRepository::new(self.pool, self.ctx.capabilities);
        if repo.find_by_email(&bootstrap.email).await?.is_some() {
            return Ok(None);
        }

        anyhow::ensure!(
            !bootstrap.password.trim().is_empty(),
            "Bootstrap account password must not be empty"
        );

        let password_hash = self
            .ctx
            .password_policy
            .hash(&bootstrap.password)
            .context("Password hashing failed")?;

        let account = NewAccount {
            email: bootstrap.email.clone(),
            username: None,
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            role: bootstrap.role.clone(),
        };

        if let Err(validation_errors) = account.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(anyhow!(error_messages.join(", ")));
        }

        let id = repo.create_account(&account).await?;
        info!(account_id = id, role = %account.role, "Bootstrap account created");
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::Authenticator;
    use crate::test_support::{migrated_pool, test_context};

    fn bootstrap(email: &str) -> BootstrapAccount {
        BootstrapAccount {
            email: email.to_string(),
            password: "changeme".to_string(),
            role: "Administrator".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_account_is_created_once() {
        let pool = migrated_pool().await;
        let ctx = test_context(&pool).await;
        let service = AccountService::new(&pool, &ctx);

        let created = service
            .ensure_bootstrap_account(&bootstrap("admin@safetycampaign.org"))
            .await
            .unwrap();
        assert!(created.is_some());

        let again = service
            .ensure_bootstrap_account(&bootstrap("admin@safetycampaign.org"))
            .await
            .unwrap();
        assert!(again.is_none());

        let outcome = Authenticator::new(&pool, &ctx)
            .authenticate("admin@safetycampaign.org", "changeme", false)
            .await
            .unwrap();
        let session = crate::services::session_service::SessionService::new(&pool, 3600)
            .load(&outcome.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.role, "Administrator");
        assert_eq!(session.avatar, "");
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_invalid_email() {
        let pool = migrated_pool().await;
        let ctx = test_context(&pool).await;

        let result = AccountService::new(&pool, &ctx)
            .ensure_bootstrap_account(&bootstrap("not-an-email"))
            .await;
        assert!(result.is_err());
    }
}
