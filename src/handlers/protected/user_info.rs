// handlers/protected/user_info.rs - GET /user_info

use axum::{extract::State, Extension};
use sqlx::PgPool;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service;

/// Profile of the authenticated caller
pub async fn user_info_get(State(pool): State<PgPool>, Extension(caller): Extension<AuthUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user_service::get(&pool, caller.user_id).await?))
}
