use thiserror::Error;

use crate::database::DatabaseError;
use crate::error::FieldErrors;

/// Observer system errors with structured error types
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("Validation failed on {} field(s)", .0.len())]
    ValidationError(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Pipeline execution failed: {0}")]
    PipelineError(String),
}

impl ObserverError {
    /// Single-field validation error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        ObserverError::ValidationError(errors)
    }

    /// Fold the errors collected in one run into the one reported to the caller.
    /// Validation errors merge by field; any other error wins outright.
    pub fn merge(errors: Vec<ObserverError>) -> Option<ObserverError> {
        let mut merged = FieldErrors::new();
        let mut other = None;

        for error in errors {
            match error {
                ObserverError::ValidationError(fields) => {
                    for (field, messages) in fields {
                        merged.entry(field).or_default().extend(messages);
                    }
                }
                error => {
                    if other.is_none() {
                        other = Some(error);
                    }
                }
            }
        }

        match other {
            Some(error) => Some(error),
            None if merged.is_empty() => None,
            None => Some(ObserverError::ValidationError(merged)),
        }
    }
}

/// Observer warnings (non-fatal issues)
#[derive(Debug, Clone)]
pub struct ObserverWarning {
    pub observer: &'static str,
    pub message: String,
}

impl ObserverWarning {
    pub fn new(observer: &'static str, message: impl Into<String>) -> Self {
        Self {
            observer,
            message: message.into(),
        }
    }
}
