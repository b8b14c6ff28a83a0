//! Local account store: keyed user records with salted password hashes.
//!
//! `service` holds the operations, `response` translates their results into
//! the uniform `{success, message}` shape handed to callers.

pub mod domain;
pub mod errors;
pub mod password;
pub mod response;
pub mod service;

pub use errors::AccountError;
pub use service::AccountService;
