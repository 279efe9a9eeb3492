// handlers/elevated/districts.rs - POST /districts/create

use axum::extract::State;
use sqlx::PgPool;

use crate::database::models::{District, DistrictInput};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::reference_service;

pub async fn create_post(State(pool): State<PgPool>, ApiJson(input): ApiJson<DistrictInput>) -> ApiResult<District> {
    Ok(ApiResponse::created(reference_service::create_district(&pool, &input).await?))
}
