//! Service layer for the EmuDock persistence backend.
//! - JSON document storage and a keyed record store on top of it.
//! - Account store with salted PBKDF2 password hashing.
//! - Game library, settings and free-form user data tables.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod accounts;
pub mod library;
pub mod settings;
pub mod user_data;
pub mod session;
#[cfg(test)]
pub mod test_support;
