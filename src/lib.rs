pub mod auth;
pub mod client;
pub mod db;
pub mod directory;
pub mod error;
pub mod messages;
pub mod relay;
pub mod store;

use std::sync::Arc;

use axum::{Json, Router, debug_handler, extract::FromRef, routing::get};
use serde_json::json;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub auth_keys: auth::AuthKeys,
    pub relay: Arc<relay::Relay>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .nest("/auth", auth::router())
        .nest("/messages", messages::router())
        .merge(relay::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
}

#[debug_handler]
async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "Follow Up API" }))
}
