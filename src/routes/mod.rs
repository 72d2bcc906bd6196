use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::coordinator::GameCoordinator;

mod game;
mod health;
mod metrics;

/// Shared by every handler.
pub struct AppState {
    pub coordinator: Arc<GameCoordinator>,
    pub config: Config,
}

pub fn create_router(config: &Config) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::get))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/game", get(game::find_by_code).post(game::create))
        .route("/game/:game_id/start", post(game::start))
        .route("/game/:game_id/players", post(game::add_player))
        .route(
            "/game/:game_id/questions/current",
            get(game::current_question),
        )
        .route(
            "/game/:game_id/players/:player_id/ws",
            get(game::connect_player_to_websocket),
        )
        .route(
            "/game/:game_id/creator/:creator_id/ws",
            get(game::connect_creator_to_websocket),
        )
        .layer(if config.allow_cors {
            log::info!("CorsLayer Permissive");
            CorsLayer::permissive()
        } else {
            CorsLayer::default()
        })
}
