use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::app::AppState;
use crate::error::ApiError;
use crate::services::user_service;

/// Re-checks the token's user against the users table. Inactive or deleted
/// users are rejected; district and superuser flag come from the database,
/// so reassignments take effect without waiting for token expiry.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = user_service::find_active(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(
                "User validation failed: user '{}' (ID: {}) not found or inactive",
                auth_user.username,
                auth_user.user_id
            );
            ApiError::unauthorized("User is not active")
        })?;

    let validated = AuthUser {
        user_id: user.id,
        username: user.username,
        district_id: user.district_id,
        is_superuser: user.is_superuser,
    };

    tracing::debug!(
        "User validation successful: {} (district {:?}, superuser {})",
        validated.username,
        validated.district_id,
        validated.is_superuser
    );

    request.extensions_mut().insert(validated);

    Ok(next.run(request).await)
}

/// Gate for elevated routes; must run after `validate_user_middleware`
pub async fn require_superuser_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_superuser = request
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.is_superuser)
        .unwrap_or(false);

    if !is_superuser {
        return Err(ApiError::forbidden("Superuser privileges required"));
    }

    Ok(next.run(request).await)
}
