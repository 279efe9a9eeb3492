use serde::Deserialize;

use crate::database::models::LandType;

/// Query-string parameters accepted by list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub district: Option<i64>,
    pub region: Option<i64>,
    pub is_checked: Option<bool>,
    pub is_deleting: Option<bool>,
    pub land_type: Option<LandType>,
    /// Restricts child-resource lists to one plantation
    pub plantation: Option<i64>,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    /// SQL expression the API column name resolved to
    pub column: &'static str,
    pub sort: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}
