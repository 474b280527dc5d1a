//! Global application error types.
//!
//! Login and logout failures are reported through [`AuthError`]. Every variant carries
//! a fixed, client-safe message; diagnostic detail stays in the server log.

use axum::http::StatusCode;
use thiserror::Error;

/// Failure kinds surfaced by the authenticator.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identifier or password empty after trimming. Raised before the store is touched.
    #[error("missing credentials")]
    MissingCredentials,

    /// Unknown identifier, ambiguous identifier or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The matched account has no usable password hash.
    #[error("account {account_id} has no usable password hash")]
    AccountMisconfigured { account_id: i64 },

    /// The credential store could not be reached.
    #[error("credential store unavailable: {source}")]
    StoreUnavailable {
        #[source]
        source: anyhow::Error,
    },

    #[error("internal error: {message}")]
    InternalError { message: String },
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    pub fn store_unavailable(source: impl Into<anyhow::Error>) -> Self {
        Self::StoreUnavailable {
            source: source.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Message safe to render in a response body.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "Email and password are required.",
            AuthError::InvalidCredentials => "Invalid email or password.",
            AuthError::AccountMisconfigured { .. } => {
                "Your account is not set up correctly. Please contact support."
            }
            AuthError::StoreUnavailable { .. } => {
                "Sign-in is temporarily unavailable. Please try again later."
            }
            AuthError::InternalError { .. } => "An unexpected error occurred. Please try again.",
        }
    }

    /// Machine-readable kind used in logs and JSON envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountMisconfigured { .. } => "account_misconfigured",
            AuthError::StoreUnavailable { .. } => "store_unavailable",
            AuthError::InternalError { .. } => "internal_error",
        }
    }

    /// Status used when the login form is re-rendered with this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidCredentials
            | AuthError::AccountMisconfigured { .. } => StatusCode::OK,
            AuthError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_hide_detail() {
        let err = AuthError::store_unavailable(anyhow::anyhow!("no such table: users"));
        assert!(!err.user_message().contains("users"));
        assert!(err.to_string().contains("no such table"));

        let err = AuthError::internal_error("token signing failed");
        assert!(!err.user_message().contains("token"));
    }

    #[test]
    fn test_enumeration_safe_messages() {
        assert_eq!(
            AuthError::InvalidCredentials.user_message(),
            "Invalid email or password."
        );
        assert_eq!(
            AuthError::MissingCredentials.user_message(),
            "Email and password are required."
        );
        assert_ne!(
            AuthError::AccountMisconfigured { account_id: 1 }.user_message(),
            AuthError::InvalidCredentials.user_message()
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::OK);
        assert_eq!(
            AuthError::store_unavailable(anyhow::anyhow!("down")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::internal_error("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
