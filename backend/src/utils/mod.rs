//! Shared helpers: password hashing policy, remember tokens and random identifiers.

pub mod generate_random_string;
pub mod password;
pub mod remember_token;

pub use generate_random_string::generate_random_string;
