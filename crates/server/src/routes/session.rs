use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::ServerState;

pub async fn current_user(State(state): State<ServerState>) -> Json<Value> {
    let user = state.session.current().await;
    Json(json!({"signedIn": user.is_some(), "user": user}))
}

pub async fn sign_out(State(state): State<ServerState>) -> Json<Value> {
    let previous = state.session.sign_out().await;
    Json(json!({"success": true, "user": previous.map(|p| p.username)}))
}
