use serde::Deserialize;
use sqlx::PgPool;

use super::{ensure_valid, ServiceError};
use crate::auth::password::{hash_password, verify_password};
use crate::database::models::User;
use crate::database::repository::{reference, user as users};
use crate::error::FieldErrors;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub district: Option<i64>,
    #[serde(default)]
    pub is_superuser: bool,
}

impl CreateUserRequest {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let username = self.username.trim();
        if username.is_empty() {
            errors.entry("username".into()).or_default().push("Username is required".into());
        } else if username.chars().count() > 150 {
            errors
                .entry("username".into())
                .or_default()
                .push("Ensure this field has no more than 150 characters".into());
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors
                .entry("password".into())
                .or_default()
                .push(format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH));
        }
        errors
    }
}

/// User by id, only while the account is active
pub async fn find_active(pool: &PgPool, user_id: i64) -> Result<Option<User>, ServiceError> {
    Ok(users::by_id(pool, user_id).await?.filter(|user| user.is_active))
}

/// Check credentials. Unknown user, inactive account and wrong password all
/// produce the same error.
pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<User, ServiceError> {
    let Some(user) = users::by_username(pool, username).await? else {
        tracing::warn!("Login failed: unknown user '{}'", username);
        return Err(ServiceError::InvalidCredentials);
    };

    if !user.is_active {
        tracing::warn!("Login failed: user '{}' is inactive", username);
        return Err(ServiceError::InvalidCredentials);
    }

    if !verify_password(password, &user.password_hash)? {
        tracing::warn!("Login failed: wrong password for '{}'", username);
        return Err(ServiceError::InvalidCredentials);
    }

    tracing::info!("User '{}' authenticated", username);
    Ok(user)
}

pub async fn create(pool: &PgPool, request: &CreateUserRequest) -> Result<User, ServiceError> {
    let mut errors = request.validate();
    if let Some(district) = request.district {
        if reference::district(pool, district).await?.is_none() {
            errors
                .entry("district".into())
                .or_default()
                .push(format!("District {} does not exist", district));
        }
    }
    ensure_valid(errors)?;

    let password_hash = hash_password(&request.password)?;
    let user = users::insert(
        pool,
        &users::NewUser {
            username: request.username.trim(),
            password_hash: &password_hash,
            first_name: &request.first_name,
            last_name: &request.last_name,
            phone_number: &request.phone_number,
            district_id: request.district,
            is_superuser: request.is_superuser,
        },
    )
    .await?;

    tracing::info!("Created user '{}' (ID: {})", user.username, user.id);
    Ok(user)
}

pub async fn list(pool: &PgPool) -> Result<Vec<User>, ServiceError> {
    Ok(users::list(pool).await?)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<User, ServiceError> {
    users::by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_password_and_blank_username_are_rejected() {
        let request: CreateUserRequest = serde_json::from_value(json!({
            "username": "  ",
            "password": "short"
        }))
        .unwrap();
        let errors = request.validate();
        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn optional_fields_default() {
        let request: CreateUserRequest = serde_json::from_value(json!({
            "username": "inspector",
            "password": "long-enough"
        }))
        .unwrap();
        assert!(request.validate().is_empty());
        assert!(!request.is_superuser);
        assert!(request.district.is_none());
    }
}
