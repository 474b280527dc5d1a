//! Remember-me token utilities.
//!
//! Tokens are HS256-signed JWTs bound to an account id with a 30 day horizon. They are
//! delivered only as an HTTP-only cookie and never authenticate a request on their own.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AuthError, AuthResult};

pub const REMEMBER_TOKEN_COOKIE: &str = "remember_token";
pub const REMEMBER_TOKEN_DAYS: i64 = 30;

/// Claims carried by a remember token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RememberClaims {
    /// Account ID
    pub sub: String,
    /// Unique token id, so two tokens issued in the same second still differ
    pub jti: String,
    pub exp: usize,
    pub iat: usize,
}

/// Issues and checks remember tokens
pub struct RememberTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl RememberTokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        RememberTokenIssuer {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `account_id`, valid for [`REMEMBER_TOKEN_DAYS`].
    pub fn issue(&self, account_id: i64) -> AuthResult<String> {
        self.issue_at(account_id, Utc::now())
    }

    fn issue_at(&self, account_id: i64, now: DateTime<Utc>) -> AuthResult<String> {
        let exp = now + Duration::days(REMEMBER_TOKEN_DAYS);

        let claims = RememberClaims {
            sub: account_id.to_string(),
            jti: Uuid::now_v7().to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AuthError::internal_error(format!("Remember token generation failed: {}", e))
        })
    }

    /// Checks signature, expiry and subject; returns the bound account id.
    pub fn validate(&self, token: &str) -> AuthResult<i64> {
        let claims = decode::<RememberClaims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|_| AuthError::InvalidCredentials)?;

        claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidCredentials)
    }
}
