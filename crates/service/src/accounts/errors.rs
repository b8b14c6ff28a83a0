use thiserror::Error;

use crate::storage::StoreError;

/// Failures of account operations
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("User already exists")]
    AlreadyExists,
    #[error("User not found")]
    NotFound,
    #[error("Invalid password")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AccountError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AccountError::Validation(_) => 1001,
            AccountError::AlreadyExists => 1002,
            AccountError::NotFound => 1003,
            AccountError::InvalidCredentials => 1004,
            AccountError::Storage(_) => 1200,
        }
    }
}
