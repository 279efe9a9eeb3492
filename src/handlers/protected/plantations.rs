// handlers/protected/plantations.rs - /plantations endpoints

use axum::{
    extract::State,
    Extension,
};
use sqlx::PgPool;

use crate::api::format::{MapItem, PlantationDetail};
use crate::database::models::{PlantationInput, PlantationPatch, PlantationSummary};
use crate::filter::ListParams;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::plantation_service;

/// GET /plantations - list view
pub async fn list_get(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Vec<PlantationSummary>> {
    Ok(ApiResponse::success(plantation_service::list(&pool, &caller, params).await?))
}

/// GET /plantations/full - detail view of every visible plantation
pub async fn full_get(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Vec<PlantationDetail>> {
    Ok(ApiResponse::success(plantation_service::list_full(&pool, &caller, params).await?))
}

/// GET /plantations/map
pub async fn map_get(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Vec<MapItem>> {
    Ok(ApiResponse::success(plantation_service::map(&pool, &caller, params).await?))
}

/// POST /plantations/create - plantation with nested collections in one transaction
pub async fn create_post(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(input): ApiJson<PlantationInput>,
) -> ApiResult<PlantationDetail> {
    Ok(ApiResponse::created(plantation_service::create(&pool, &caller, input).await?))
}

/// GET /plantations/:id
pub async fn record_get(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<PlantationDetail> {
    Ok(ApiResponse::success(plantation_service::get(&pool, &caller, id).await?))
}

/// PUT /plantations/:id - full replacement
pub async fn record_put(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<PlantationInput>,
) -> ApiResult<PlantationDetail> {
    Ok(ApiResponse::success(plantation_service::replace(&pool, &caller, id, input).await?))
}

/// PATCH /plantations/:id - merge over the stored row
pub async fn record_patch(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<PlantationPatch>,
) -> ApiResult<PlantationDetail> {
    Ok(ApiResponse::success(plantation_service::patch(&pool, &caller, id, patch).await?))
}

/// DELETE /plantations/:id - cascades to every owned row
pub async fn record_delete(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    plantation_service::delete(&pool, &caller, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
