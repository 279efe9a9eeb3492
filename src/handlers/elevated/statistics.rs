// handlers/elevated/statistics.rs - GET /statistics

use axum::extract::State;
use sqlx::PgPool;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::statistics_service::{self, Statistics};

/// Registry-wide aggregates; not filtered by district
pub async fn statistics_get(State(pool): State<PgPool>) -> ApiResult<Statistics> {
    Ok(ApiResponse::success(statistics_service::collect(&pool).await?))
}
