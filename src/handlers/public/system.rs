// handlers/public/system.rs - GET /, GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::database::DatabaseManager;

pub async fn root_get() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Plantation Registry API",
            "version": version,
            "description": "Registry of agricultural plantations by district",
            "endpoints": {
                "home": "/, /health (public)",
                "auth": "/login, /refresh (public - token acquisition)",
                "user": "/user_info (protected)",
                "plantations": "/plantations[/full|/map|/create|/:id] (protected)",
                "infrastructure": "/subsidies, /investments, /reservoirs, /trellises [/:id] (protected)",
                "reference": "/farmers, /fruits, /rootstocks, /regions, /districts (protected)",
                "admin": "/users, /districts/create, /statistics (superuser)",
            }
        }
    }))
}

pub async fn health_get(State(pool): State<PgPool>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "SERVICE_UNAVAILABLE",
                    "message": "Database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
