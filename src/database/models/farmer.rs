use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Farmer {
    pub id: i64,
    pub name: String,
    pub founder_name: String,
    pub director_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: String,
    pub inn: String,
    pub established_year: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FarmerInput {
    pub name: String,
    pub founder_name: String,
    pub director_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    pub address: String,
    pub inn: String,
    pub established_year: i32,
}
