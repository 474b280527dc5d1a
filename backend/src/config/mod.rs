//! Central module for application-wide configuration settings.
//!
//! This module handles loading the console's configuration from the environment:
//! database location and pool sizing, the password hashing policy, session lifetime,
//! cookie attributes and the secret used to sign remember-me tokens.

use anyhow::{Context, Result, ensure};
use std::env;

/// Path of the login entry point. Never used as a post-login redirect target.
pub const LOGIN_PATH: &str = "/login";

/// Accepted `BCRYPT_COST` range. A dummy hash is computed at this cost during startup.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=16;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub remember_token_secret: String,
    pub bcrypt_cost: u32,
    pub session_ttl_seconds: u64,
    pub session_sweep_interval_seconds: u64,
    pub secure_cookies: bool,
    pub landing_path: String,
    pub server_port: u16,
    pub bootstrap_account: Option<BootstrapAccount>,
}

/// Account created at startup when no account with the same email exists yet.
#[derive(Debug, Clone)]
pub struct BootstrapAccount {
    pub email: String,
    pub password: String,
    pub role: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let remember_token_secret =
            env::var("REMEMBER_TOKEN_SECRET").context("REMEMBER_TOKEN_SECRET not set")?;
        ensure!(
            !remember_token_secret.trim().is_empty(),
            "REMEMBER_TOKEN_SECRET must not be empty"
        );

        let bcrypt_cost = parse_bcrypt_cost(
            &env::var("BCRYPT_COST").unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string()),
        )?;

        let session_ttl_seconds = env::var("SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "7200".to_string())
            .parse::<u64>()
            .context("SESSION_TTL_SECONDS must be a valid number")?;

        let session_sweep_interval_seconds = env::var("SESSION_SWEEP_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .context("SESSION_SWEEP_INTERVAL_SECONDS must be a valid number")?;

        let secure_cookies = env::var("SECURE_COOKIES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .context("SECURE_COOKIES must be true or false")?;

        let landing_path = env::var("LANDING_PATH").unwrap_or_else(|_| "/dashboard".to_string());
        ensure!(
            landing_path.starts_with('/'),
            "LANDING_PATH must be an absolute path"
        );

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let bootstrap_account = match (
            env::var("BOOTSTRAP_ACCOUNT_EMAIL"),
            env::var("BOOTSTRAP_ACCOUNT_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAccount {
                email,
                password,
                role: env::var("BOOTSTRAP_ACCOUNT_ROLE")
                    .unwrap_or_else(|_| "Administrator".to_string()),
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            remember_token_secret,
            bcrypt_cost,
            session_ttl_seconds,
            session_sweep_interval_seconds,
            secure_cookies,
            landing_path,
            server_port,
            bootstrap_account,
        })
    }
}

fn parse_bcrypt_cost(raw: &str) -> Result<u32> {
    let cost = raw
        .trim()
        .parse::<u32>()
        .context("BCRYPT_COST must be a valid number")?;
    ensure!(
        BCRYPT_COST_RANGE.contains(&cost),
        "BCRYPT_COST must be between {} and {}",
        BCRYPT_COST_RANGE.start(),
        BCRYPT_COST_RANGE.end()
    );
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bcrypt_cost() {
        assert_eq!(parse_bcrypt_cost("12").unwrap(), 12);
        assert_eq!(parse_bcrypt_cost(" 4 ").unwrap(), 4);
        assert_eq!(parse_bcrypt_cost("16").unwrap(), 16);
        assert!(parse_bcrypt_cost("3").is_err());
        assert!(parse_bcrypt_cost("17").is_err());
        assert!(parse_bcrypt_cost("31").is_err());
        assert!(parse_bcrypt_cost("twelve").is_err());
    }
}
