// handlers/public/auth.rs - POST /login, POST /refresh

use axum::extract::State;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{decode_jwt, issue_token_pair, TokenType};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::user_service;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

/// POST /login - exchange credentials for an access/refresh token pair
pub async fn login_post(
    State(pool): State<PgPool>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let user = user_service::authenticate(&pool, body.username.trim(), &body.password).await?;
    let tokens = issue_token_pair(user.id, &user.username, user.district_id, user.is_superuser)?;

    Ok(ApiResponse::success(LoginResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        user,
    }))
}

/// POST /refresh - rotate a refresh token into a new pair. District and
/// superuser flag are re-read so the new tokens reflect the current account.
pub async fn refresh_post(
    State(pool): State<PgPool>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> ApiResult<crate::auth::TokenPair> {
    let claims = decode_jwt(&body.refresh, TokenType::Refresh).map_err(|e| {
        tracing::warn!("Rejected refresh token: {}", e);
        ApiError::from(e)
    })?;

    let user = user_service::find_active(&pool, claims.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User is not active"))?;

    let tokens = issue_token_pair(user.id, &user.username, user.district_id, user.is_superuser)?;
    tracing::info!("Refreshed tokens for '{}'", user.username);

    Ok(ApiResponse::success(tokens))
}
