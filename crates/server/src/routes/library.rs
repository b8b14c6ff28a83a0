use std::path::PathBuf;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use service::library::GameEntry;

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    /// Optional folder scanned recursively for ROMs.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

pub async fn save_game_data(State(state): State<ServerState>, Json(games): Json<Vec<GameEntry>>) -> Result<Json<Value>, ApiError> {
    state.library.save_all(&games).await?;
    Ok(Json(json!({"success": true})))
}

pub async fn load_game_data(State(state): State<ServerState>) -> Result<Json<Vec<GameEntry>>, ApiError> {
    Ok(Json(state.library.list().await?))
}

pub async fn import_games(State(state): State<ServerState>, Json(req): Json<ImportRequest>) -> Result<Json<Value>, ApiError> {
    // a bad folder fails the request before anything is written
    let mut paths = req.paths;
    if let Some(dir) = &req.directory {
        paths.extend(state.library.rom_files_in(dir).await?);
    }
    let imported = state.library.import_files(paths.as_slice()).await?.len();
    Ok(Json(json!({
        "success": true,
        "message": format!("Imported {imported} games"),
        "imported": imported,
    })))
}
