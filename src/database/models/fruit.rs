use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Fruit {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FruitVariety {
    pub id: i64,
    #[serde(rename = "fruit")]
    pub fruit_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rootstock {
    pub id: i64,
    #[serde(rename = "fruit")]
    pub fruit_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootstockInput {
    pub fruit: i64,
    pub name: String,
}
