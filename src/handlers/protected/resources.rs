// handlers/protected/resources.rs - /subsidies, /investments, /reservoirs, /trellises
//
// Generic over the child table; the router instantiates one set per resource,
// e.g. `get(resources::list_get::<Subsidy>)`.

use axum::{
    extract::State,
    Extension,
};
use serde::de::DeserializeOwned;
use sqlx::PgPool;

use crate::database::repository::ChildResource;
use crate::filter::ListParams;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::resource_service;

/// GET /{resource}?plantation=&limit=&offset=
pub async fn list_get<T: ChildResource>(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Vec<T>> {
    Ok(ApiResponse::success(resource_service::list::<T>(&pool, &caller, params).await?))
}

/// POST /{resource}
pub async fn create_post<T>(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(input): ApiJson<T::Input>,
) -> ApiResult<T>
where
    T: ChildResource,
    T::Input: DeserializeOwned,
{
    Ok(ApiResponse::created(resource_service::create::<T>(&pool, &caller, input).await?))
}

/// GET /{resource}/:id
pub async fn record_get<T: ChildResource>(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<T> {
    Ok(ApiResponse::success(resource_service::get::<T>(&pool, &caller, id).await?))
}

/// PUT /{resource}/:id
pub async fn record_put<T>(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<T::Input>,
) -> ApiResult<T>
where
    T: ChildResource,
    T::Input: DeserializeOwned,
{
    Ok(ApiResponse::success(resource_service::update::<T>(&pool, &caller, id, input).await?))
}

/// DELETE /{resource}/:id
pub async fn record_delete<T: ChildResource>(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    resource_service::delete::<T>(&pool, &caller, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
