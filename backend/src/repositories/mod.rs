//! Data access for accounts and server-side sessions.

pub mod account_repository;
pub mod session_repository;
