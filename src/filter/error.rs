use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid order column: {0}")]
    InvalidColumn(String),

    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),
}
