//! Data structures for the login flow.
//!
//! This module defines the login identifier, the session payload handed to protected
//! pages, and the form and query payloads accepted by the login endpoints.

use crate::database::models::Account;
use serde::{Deserialize, Serialize};

/// Login identifier, resolved once before any store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Username(String),
}

impl LoginIdentifier {
    /// Classifies a trimmed, non-empty identifier. Anything containing `@` is an email.
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim().to_string();
        if value.contains('@') {
            LoginIdentifier::Email(value)
        } else {
            LoginIdentifier::Username(value)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LoginIdentifier::Email(value) | LoginIdentifier::Username(value) => value,
        }
    }
}

/// Per-browser authenticated context persisted in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account_id: i64,
    /// First and last name, trimmed
    pub name: String,
    pub email: String,
    pub role: String,
    /// Explicit avatar label or initials fallback
    pub avatar: String,
    /// One-shot flag for post-login UI; cleared on first read
    #[serde(default)]
    pub login_success: bool,
}

impl Session {
    pub fn from_account(account: &Account) -> Self {
        let name = format!("{} {}", account.first_name.trim(), account.last_name.trim())
            .trim()
            .to_string();

        let avatar = match account.avatar.as_deref().map(str::trim) {
            Some(avatar) if !avatar.is_empty() => avatar.to_string(),
            _ => initials(&account.first_name, &account.last_name),
        };

        Session {
            account_id: account.id,
            name,
            email: account.email.clone(),
            role: account.role.clone(),
            avatar,
            login_success: true,
        }
    }
}

/// Uppercase first letters of first and last name; empty when both names are empty.
pub fn initials(first_name: &str, last_name: &str) -> String {
    [first_name, last_name]
        .iter()
        .filter_map(|name| name.trim().chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Session visible to a protected handler for the duration of one request.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub session: Session,
}

/// Result of a successful `authenticate` call.
#[derive(Debug)]
pub struct LoginOutcome {
    pub session_id: String,
    /// Present only when remember-me was requested and issuing succeeded
    pub remember_token: Option<String>,
}

/// Form-encoded login submission
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox value; any value other than `0`/`false`/`off` opts in
    pub remember_me: Option<String>,
    pub next: Option<String>,
}

impl LoginForm {
    pub fn remember_requested(&self) -> bool {
        match self.remember_me.as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") | Some("off") => false,
            Some(_) => true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}
