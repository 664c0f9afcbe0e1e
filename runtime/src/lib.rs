use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

pub mod detection;
pub mod graph;
pub mod ledger;
pub mod pipeline;
pub mod routes;

pub use pipeline::Pipeline;

pub const SUPPORTED_EXTENSIONS: &[&str] = &[".csv"];

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub working_dir: String,
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    pub base_url: String,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<Pipeline>,
}

pub fn app(state: Arc<AppState>) -> Router {
    // The analyst frontend runs on its own dev server.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(routes::ledger_routes())
        .merge(routes::graph_routes())
        .merge(routes::download_routes())
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Money Muling Detection Engine API" }))
}

#[inline]
async fn health() -> &'static str {
    "ok"
}
