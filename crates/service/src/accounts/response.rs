use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::errors::AccountError;

/// Which account operation produced a result; selects the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOp {
    Create,
    Authenticate,
    Update,
    ChangePassword,
    Delete,
    Get,
}

impl AccountOp {
    fn success_message(self) -> &'static str {
        match self {
            AccountOp::Create => "User created successfully",
            AccountOp::Authenticate => "Authentication successful",
            AccountOp::Update => "User updated successfully",
            AccountOp::ChangePassword => "Password changed successfully",
            AccountOp::Delete => "User deleted successfully",
            AccountOp::Get => "User found",
        }
    }

    fn failure_message(self, err: &AccountError) -> String {
        match (self, err) {
            (AccountOp::ChangePassword, AccountError::InvalidCredentials) => "Current password is incorrect".into(),
            (AccountOp::Create, AccountError::Storage(_)) => "Failed to save user data".into(),
            (AccountOp::Update, AccountError::Storage(_)) => "Failed to update user".into(),
            (AccountOp::ChangePassword, AccountError::Storage(_)) => "Failed to change password".into(),
            (AccountOp::Delete, AccountError::Storage(_)) => "Failed to delete user".into(),
            (_, err) => err.to_string(),
        }
    }
}

/// Uniform `{success, message, user?}` result handed back to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

impl AccountResponse {
    pub fn failure(op: AccountOp, err: &AccountError) -> Self {
        warn!(?op, code = err.code(), error = %err, "account operation failed");
        Self { success: false, message: op.failure_message(err), user: None }
    }

    /// Translate an operation result; unit payloads carry no `user`.
    pub fn from_result<T: Serialize>(op: AccountOp, result: Result<T, AccountError>) -> Self {
        match result {
            Ok(payload) => match serde_json::to_value(payload) {
                Ok(Value::Null) => Self { success: true, message: op.success_message().into(), user: None },
                Ok(user) => Self { success: true, message: op.success_message().into(), user: Some(user) },
                Err(e) => Self { success: false, message: format!("serialization error: {e}"), user: None },
            },
            Err(err) => Self::failure(op, &err),
        }
    }
}
