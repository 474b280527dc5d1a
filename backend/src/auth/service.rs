//! Core business logic for the authentication system.
//!
//! [`Authenticator::authenticate`] turns an identifier and password into an established
//! session or a uniform failure. Hash upgrades and last-login stamps are best-effort
//! and never block a login that has already verified.

use crate::auth::models::{LoginIdentifier, LoginOutcome, Session};
use crate::context::AppContext;
use crate::database::models::Account;
use crate::errors::{AuthError, AuthResult};
use crate::repositories::account_repository::AccountRepository;
use crate::services::session_service::SessionService;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

/// Authentication service for handling login and logout
pub struct Authenticator<'a> {
    pool: &'a SqlitePool,
    ctx: &'a AppContext,
}

impl<'a> Authenticator<'a> {
    pub fn new(pool: &'a SqlitePool, ctx: &'a AppContext) -> Self {
        Authenticator { pool, ctx }
    }

    fn accounts(&self) -> AccountRepository<'a> {
        AccountRepository::new(self.pool, self.ctx.capabilities)
    }

    fn sessions(&self) -> SessionService<'a> {
        SessionService::new(self.pool, self.ctx.config.session_ttl_seconds)
    }

    /// Verify credentials, upgrade the stored hash if needed and open a session.
    ///
    /// # Errors
    /// - `MissingCredentials` when either field is blank; the store is not queried
    /// - `InvalidCredentials` for an unknown, ambiguous or wrong identifier/password
    /// - `AccountMisconfigured` when the matched account has no usable hash
    /// - `StoreUnavailable` when the credential lookup itself fails
    /// - `InternalError` when the session cannot be persisted
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
    ) -> AuthResult<LoginOutcome> {
        if identifier.trim().is_empty() || password.trim().is_empty() {
            warn!(identifier = identifier.trim(), kind = "missing_credentials", "Login rejected");
            return Err(AuthError::MissingCredentials);
        }

        let identifier = LoginIdentifier::parse(identifier);

        let Some(account) = self.find_account(&identifier).await? else {
            self.ctx.password_policy.verify_dummy(password);
            warn!(
                identifier = identifier.as_str(),
                kind = "invalid_credentials",
                reason = "no matching account",
                "Login rejected"
            );
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = match account.password_hash.as_deref().map(str::trim) {
            Some(hash) if !hash.is_empty() => hash.to_string(),
            _ => {
                error!(
                    identifier = identifier.as_str(),
                    account_id = account.id,
                    kind = "account_misconfigured",
                    "Account has no password hash"
                );
                return Err(AuthError::AccountMisconfigured {
                    account_id: account.id,
                });
            }
        };

        let verified = match self.ctx.password_policy.verify(password, &stored_hash) {
            Ok(verified) => verified,
            Err(e) => {
                error!(
                    identifier = identifier.as_str(),
                    account_id = account.id,
                    kind = "account_misconfigured",
                    "Stored password hash is unreadable: {}",
                    e
                );
                return Err(AuthError::AccountMisconfigured {
                    account_id: account.id,
                });
            }
        };

        if !verified {
            warn!(
                identifier = identifier.as_str(),
                kind = "invalid_credentials",
                reason = "password mismatch",
                "Login rejected"
            );
            return Err(AuthError::InvalidCredentials);
        }

        if self.ctx.password_policy.needs_rehash(&stored_hash) {
            self.upgrade_hash(&account, password).await;
        }

        if let Err(e) = self.accounts().touch_last_login(account.id).await {
            warn!(account_id = account.id, "Failed to stamp last login: {}", e);
        }

        let session = Session::from_account(&account);
        let session_id = self.sessions().create(&session).await.map_err(|e| {
            error!(account_id = account.id, "Failed to persist session: {:#}", e);
            AuthError::internal_error(format!("session creation failed: {}", e))
        })?;

        let remember_token = if remember_me {
            match self.ctx.remember_tokens.issue(account.id) {
                Ok(token) => Some(token),
                Err(e) => {
                    warn!(account_id = account.id, "Remember token not issued: {}", e);
                    None
                }
            }
        } else {
            None
        };

        info!(
            account_id = account.id,
            username = account.username.as_deref(),
            previous_login = account.last_login.as_deref(),
            remember_me = remember_token.is_some(),
            "Login succeeded"
        );

        Ok(LoginOutcome {
            session_id,
            remember_token,
        })
    }

    /// Destroy the session record. A missing or unknown session is a no-op.
    pub async fn logout(&self, session_id: Option<&str>) -> AuthResult<()> {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            return Ok(());
        };

        let removed = self.sessions().destroy(session_id).await.map_err(|e| {
            error!("Failed to destroy session: {:#}", e);
            AuthError::store_unavailable(e)
        })?;

        if removed {
            info!("Session destroyed");
        }
        Ok(())
    }

    /// Resolves exactly one account for `identifier`, or none.
    ///
    /// Emails are matched against both the email and username columns; bare names
    /// against the username column, falling back to email when the schema has no
    /// usernames. Two different accounts matching is treated as no match.
    async fn find_account(&self, identifier: &LoginIdentifier) -> AuthResult<Option<Account>> {
        let repo = self.accounts();
        let has_username = self.ctx.capabilities.has_username;

        let (by_email, by_username) = match identifier {
            LoginIdentifier::Email(email) => {
                let by_email = repo.find_by_email(email).await;
                let by_username = if has_username {
                    repo.find_by_username(email).await
                } else {
                    Ok(None)
                };
                (by_email, by_username)
            }
            LoginIdentifier::Username(name) if has_username => {
                (repo.find_by_email(name).await, repo.find_by_username(name).await)
            }
            LoginIdentifier::Username(name) => (repo.find_by_email(name).await, Ok(None)),
        };

        let by_email = by_email.map_err(|e| self.store_failure(identifier, e))?;
        let by_username = by_username.map_err(|e| self.store_failure(identifier, e))?;

        match (by_email, by_username) {
            (Some(a), Some(b)) if a.id != b.id => {
                warn!(
                    identifier = identifier.as_str(),
                    email_match = a.id,
                    username_match = b.id,
                    "Identifier matches more than one account"
                );
                Ok(None)
            }
            (Some(account), _) | (None, Some(account)) => Ok(Some(account)),
            (None, None) => Ok(None),
        }
    }

    fn store_failure(&self, identifier: &LoginIdentifier, e: anyhow::Error) -> AuthError {
        error!(
            identifier = identifier.as_str(),
            kind = "store_unavailable",
            "Credential lookup failed: {:#}",
            e
        );
        AuthError::store_unavailable(e)
    }

    async fn upgrade_hash(&self, account: &Account, password: &str) {
        let new_hash = match self.ctx.password_policy.hash(password) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(account_id = account.id, "Password rehash failed: {}", e);
                return;
            }
        };

        match self.accounts().update_password_hash(account.id, &new_hash).await {
            Ok(()) => info!(
                account_id = account.id,
                cost = self.ctx.password_policy.cost(),
                "Password hash upgraded"
            ),
            Err(e) => warn!(account_id = account.id, "Failed to persist upgraded hash: {}", e),
        }
    }
}
