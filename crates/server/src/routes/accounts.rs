//! Account channels. Failures are part of the payload (`success: false`),
//! never an HTTP error status.

use axum::{extract::State, Json};
use serde::Deserialize;

use service::accounts::domain::Profile;
use service::accounts::response::{AccountOp, AccountResponse};

use crate::state::ServerState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub additional_data: Profile,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
    #[serde(default)]
    pub updates: Profile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub username: String,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UsernameRequest {
    pub username: String,
}

pub async fn create_user(State(state): State<ServerState>, Json(req): Json<CreateUserRequest>) -> Json<AccountResponse> {
    let result = state.accounts.create_user(&req.username, &req.password, req.additional_data).await;
    Json(AccountResponse::from_result(AccountOp::Create, result))
}

/// Successful authentication also signs the user in.
pub async fn authenticate_user(State(state): State<ServerState>, Json(req): Json<CredentialsRequest>) -> Json<AccountResponse> {
    let result = state.accounts.authenticate_user(&req.username, &req.password).await;
    if let Ok(profile) = &result {
        state.session.sign_in(profile.clone()).await;
    }
    Json(AccountResponse::from_result(AccountOp::Authenticate, result))
}

pub async fn update_user_profile(State(state): State<ServerState>, Json(req): Json<UpdateProfileRequest>) -> Json<AccountResponse> {
    let result = state.accounts.update_user(&req.username, req.updates).await;
    Json(AccountResponse::from_result(AccountOp::Update, result))
}

pub async fn change_password(State(state): State<ServerState>, Json(req): Json<ChangePasswordRequest>) -> Json<AccountResponse> {
    let result = state.accounts.change_password(&req.username, &req.old_password, &req.new_password).await;
    Json(AccountResponse::from_result(AccountOp::ChangePassword, result))
}

/// Deleting the signed-in account ends the session.
pub async fn delete_user_account(State(state): State<ServerState>, Json(req): Json<CredentialsRequest>) -> Json<AccountResponse> {
    let result = state.accounts.delete_user(&req.username, &req.password).await;
    if result.is_ok() {
        state.session.sign_out_user(&req.username).await;
    }
    Json(AccountResponse::from_result(AccountOp::Delete, result))
}

pub async fn get_user_profile(State(state): State<ServerState>, Json(req): Json<UsernameRequest>) -> Json<AccountResponse> {
    let result = state.accounts.get_user(&req.username).await;
    Json(AccountResponse::from_result(AccountOp::Get, result))
}
