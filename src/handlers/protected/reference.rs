// handlers/protected/reference.rs - /fruits, /rootstocks, /regions, /districts

use axum::extract::State;
use serde::Deserialize;
use sqlx::PgPool;

use crate::database::models::{District, Region, Rootstock, RootstockInput};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::reference_service::{self, FruitCatalogEntry};

#[derive(Debug, Default, Deserialize)]
pub struct DistrictQuery {
    pub region: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RootstockQuery {
    pub fruit: Option<i64>,
}

/// GET /fruits - fruits with their varieties and rootstocks
pub async fn fruits_get(State(pool): State<PgPool>) -> ApiResult<Vec<FruitCatalogEntry>> {
    Ok(ApiResponse::success(reference_service::fruits(&pool).await?))
}

pub async fn regions_get(State(pool): State<PgPool>) -> ApiResult<Vec<Region>> {
    Ok(ApiResponse::success(reference_service::regions(&pool).await?))
}

/// GET /districts?region=
pub async fn districts_get(
    State(pool): State<PgPool>,
    ApiQuery(query): ApiQuery<DistrictQuery>,
) -> ApiResult<Vec<District>> {
    Ok(ApiResponse::success(reference_service::districts(&pool, query.region).await?))
}

/// GET /rootstocks?fruit=
pub async fn rootstocks_get(
    State(pool): State<PgPool>,
    ApiQuery(query): ApiQuery<RootstockQuery>,
) -> ApiResult<Vec<Rootstock>> {
    Ok(ApiResponse::success(reference_service::rootstocks(&pool, query.fruit).await?))
}

pub async fn rootstock_post(
    State(pool): State<PgPool>,
    ApiJson(input): ApiJson<RootstockInput>,
) -> ApiResult<Rootstock> {
    Ok(ApiResponse::created(reference_service::create_rootstock(&pool, &input).await?))
}

pub async fn rootstock_get(State(pool): State<PgPool>, ApiPath(id): ApiPath<i64>) -> ApiResult<Rootstock> {
    Ok(ApiResponse::success(reference_service::rootstock(&pool, id).await?))
}

pub async fn rootstock_put(
    State(pool): State<PgPool>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<RootstockInput>,
) -> ApiResult<Rootstock> {
    Ok(ApiResponse::success(reference_service::update_rootstock(&pool, id, &input).await?))
}

pub async fn rootstock_delete(State(pool): State<PgPool>, ApiPath(id): ApiPath<i64>) -> ApiResult<()> {
    reference_service::delete_rootstock(&pool, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
