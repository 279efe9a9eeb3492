// handlers/protected/farmers.rs - /farmers endpoints

use axum::{
    extract::State,
    Extension,
};
use sqlx::PgPool;

use crate::database::models::{Farmer, FarmerInput};
use crate::filter::ListParams;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::farmer_service;

pub async fn list_get(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Vec<Farmer>> {
    Ok(ApiResponse::success(farmer_service::list(&pool, &caller, params).await?))
}

pub async fn create_post(State(pool): State<PgPool>, ApiJson(input): ApiJson<FarmerInput>) -> ApiResult<Farmer> {
    Ok(ApiResponse::created(farmer_service::create(&pool, &input).await?))
}

pub async fn record_get(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Farmer> {
    Ok(ApiResponse::success(farmer_service::get(&pool, &caller, id).await?))
}

pub async fn record_put(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<FarmerInput>,
) -> ApiResult<Farmer> {
    Ok(ApiResponse::success(farmer_service::update(&pool, &caller, id, &input).await?))
}

pub async fn record_delete(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    farmer_service::delete(&pool, &caller, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
