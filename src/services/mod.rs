pub mod farmer_service;
pub mod plantation_service;
pub mod reference_service;
pub mod resource_service;
pub mod statistics_service;
pub mod user_service;

use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::database::DatabaseError;
use crate::error::FieldErrors;
use crate::filter::FilterError;
use crate::observer::ObserverError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid input on {} field(s)", .0.len())]
    Invalid(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Observer(#[from] ObserverError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Password error: {0}")]
    Password(String),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Password(err.to_string())
    }
}

/// Turn collected field errors into `Err(Invalid)` when there are any
pub(crate) fn ensure_valid(errors: FieldErrors) -> Result<(), ServiceError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Invalid(errors))
    }
}
