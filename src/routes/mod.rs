//! Rutas HTTP
//!
//! Router principal de la API de EcoTrack.

pub mod logistic_route_routes;
pub mod order_routes;
pub mod pricing_routes;
pub mod user_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/users", user_routes::create_user_router())
        .nest("/api/orders", order_routes::create_order_router())
        .nest("/api/routes", logistic_route_routes::create_logistic_route_router())
        .nest("/api/pricing", pricing_routes::create_pricing_router())
        .with_state(state)
}

/// Endpoint de salud simple
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ecotrack",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
