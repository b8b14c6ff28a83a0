use axum::{extract::State, Json};
use serde_json::{json, Value};

use service::settings::Settings;

use crate::errors::ApiError;
use crate::state::ServerState;

pub async fn save_user_data(State(state): State<ServerState>, Json(data): Json<Value>) -> Result<Json<Value>, ApiError> {
    state.user_data.save(&data).await?;
    Ok(Json(json!({"success": true})))
}

pub async fn load_user_data(State(state): State<ServerState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.user_data.load().await?))
}

pub async fn update_user_data(State(state): State<ServerState>, Json(updates): Json<Value>) -> Result<Json<Value>, ApiError> {
    state.user_data.update(updates).await?;
    Ok(Json(json!({"success": true})))
}

pub async fn delete_user_data(State(state): State<ServerState>) -> Result<Json<Value>, ApiError> {
    state.user_data.delete().await?;
    Ok(Json(json!({"success": true})))
}

pub async fn check_data_exists(State(state): State<ServerState>) -> Json<Value> {
    Json(json!({"exists": state.user_data.exists().await}))
}

pub async fn save_settings(State(state): State<ServerState>, Json(settings): Json<Settings>) -> Result<Json<Value>, ApiError> {
    state.settings.save(&settings).await?;
    Ok(Json(json!({"success": true})))
}

pub async fn load_settings(State(state): State<ServerState>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.settings.load().await?))
}
