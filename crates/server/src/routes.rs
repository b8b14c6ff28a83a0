use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::ServerState;

pub mod accounts;
pub mod data;
pub mod library;
pub mod session;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

/// Request/response channels, one POST route per channel name.
fn ipc_routes() -> Router<ServerState> {
    Router::new()
        .route("/save-user-data", post(data::save_user_data))
        .route("/load-user-data", post(data::load_user_data))
        .route("/update-user-data", post(data::update_user_data))
        .route("/delete-user-data", post(data::delete_user_data))
        .route("/check-data-exists", post(data::check_data_exists))
        .route("/save-settings", post(data::save_settings))
        .route("/load-settings", post(data::load_settings))
        .route("/save-game-data", post(library::save_game_data))
        .route("/load-game-data", post(library::load_game_data))
        .route("/import-games", post(library::import_games))
        .route("/create-user", post(accounts::create_user))
        .route("/authenticate-user", post(accounts::authenticate_user))
        .route("/update-user-profile", post(accounts::update_user_profile))
        .route("/change-password", post(accounts::change_password))
        .route("/delete-user-account", post(accounts::delete_user_account))
        .route("/get-user-profile", post(accounts::get_user_profile))
        .route("/current-user", post(session::current_user))
        .route("/sign-out", post(session::sign_out))
}

/// Build the full application router
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/ipc", ipc_routes())
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
