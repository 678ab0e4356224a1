// handlers/system.rs - GET / and GET /health (public)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Shop API (Rust)",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "E-commerce catalog and order backend built with Rust (Axum)",
            "endpoints": {
                "products": "/products[/:id] (search public, writes admin)",
                "categories": "/categories[/:id[/subtree]] (reads public, writes admin)",
                "countries": "/countries[/:id] (reads public, writes admin)",
                "payment_methods": "/payment-methods[/:id] (reads public, writes admin)",
                "orders": "/orders, /orders/mine, /orders/:id[/complete] (user or admin)",
                "health": "/health (public)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(database) = &state.database else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "in-memory" }
            })),
        );
    };

    match database.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
