use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Region {
    pub id: i64,
    pub name: String,
}

/// District joined with the name of its region
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct District {
    pub id: i64,
    #[serde(rename = "region")]
    pub region_id: i64,
    pub region_name: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistrictInput {
    pub region: i64,
    pub name: String,
}
