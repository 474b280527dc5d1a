//! Authentication module for the console's login flow.
//!
//! This module provides credential verification, session issuance, the session guard
//! used by protected pages, and the login/logout endpoints.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod views;
