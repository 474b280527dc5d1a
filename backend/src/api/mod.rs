//! JSON endpoints of the console.
//!
//! The login flow itself lives in `auth`; this module holds the JSON views consumed
//! by page scripts, all sharing the [`common::ApiResponse`] envelope.

pub mod common;
pub mod session;
