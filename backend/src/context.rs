//! Process-wide state shared by every request.
//!
//! Built once at startup: configuration, the schema capabilities discovered from the
//! credential store, the password hashing policy, the remember-token issuer and the
//! page templates.

use crate::auth::views::Views;
use crate::config::Config;
use crate::repositories::account_repository::SchemaCapabilities;
use crate::utils::password::PasswordPolicy;
use crate::utils::remember_token::RememberTokenIssuer;
use anyhow::{Context, Result};
use sqlx::SqlitePool;

pub struct AppContext {
    pub config: Config,
    pub capabilities: SchemaCapabilities,
    pub password_policy: PasswordPolicy,
    pub remember_tokens: RememberTokenIssuer,
    pub views: Views,
}

impl AppContext {
    pub async fn initialize(config: Config, pool: &SqlitePool) -> Result<Self> {
        let capabilities = SchemaCapabilities::discover(pool)
            .await
            .context("Failed to inspect users table")?;
        let password_policy = PasswordPolicy::new(config.bcrypt_cost)
            .context("Failed to initialize password policy")?;
        let remember_tokens = RememberTokenIssuer::new(&config.remember_token_secret);
        let views = Views::new().context("Failed to register page templates")?;

        Ok(AppContext {
            config,
            capabilities,
            password_policy,
            remember_tokens,
            views,
        })
    }
}
