//! Business services built on top of the repositories.

pub mod account_service;
pub mod session_service;
