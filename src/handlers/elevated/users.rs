// handlers/elevated/users.rs - /users administration

use axum::extract::State;
use sqlx::PgPool;

use crate::database::models::User;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::services::user_service::{self, CreateUserRequest};

pub async fn list_get(State(pool): State<PgPool>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(user_service::list(&pool).await?))
}

/// POST /users - password is hashed before storage and never echoed back
pub async fn create_post(
    State(pool): State<PgPool>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<User> {
    Ok(ApiResponse::created(user_service::create(&pool, &request).await?))
}

pub async fn record_get(State(pool): State<PgPool>, ApiPath(id): ApiPath<i64>) -> ApiResult<User> {
    Ok(ApiResponse::success(user_service::get(&pool, id).await?))
}
