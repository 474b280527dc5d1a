//! Rust structs that represent database table mappings.
//!
//! These models define the structure of accounts and sessions as they are stored in
//! and retrieved from SQLite. They differ from the session payload handed to pages,
//! which lives in `auth::models`.

use serde::Deserialize;
use sqlx::FromRow;
use validator::Validate;

/// The credential and display columns of a `users` row.
///
/// `username` and `last_login` are read as `NULL` when the schema has no such column.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    /// Never logged, never serialized.
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAccount {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Username must be between 1-255 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 1, message = "Password hash is required"))]
    pub password_hash: String,
    #[validate(length(max = 255, message = "First name too long"))]
    pub first_name: String,
    #[validate(length(max = 255, message = "Last name too long"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 100, message = "Role must be between 1-100 characters"))]
    pub role: String,
}

/// Live part of a `sessions` row. `expires_at` is unix seconds.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub account_id: i64,
    pub data: String,
    pub expires_at: i64,
}
