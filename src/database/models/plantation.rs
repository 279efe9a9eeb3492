use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::infrastructure::{InvestmentFields, ReservoirFields, TrellisFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "land_type")]
pub enum LandType {
    #[serde(rename = "лялими")]
    #[sqlx(rename = "лялими")]
    Lalmi,
    #[serde(rename = "тог олди")]
    #[sqlx(rename = "тог олди")]
    Foothill,
    #[serde(rename = "адир")]
    #[sqlx(rename = "адир")]
    Adir,
    #[serde(rename = "сувли")]
    #[sqlx(rename = "сувли")]
    Irrigated,
}

impl LandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LandType::Lalmi => "лялими",
            LandType::Foothill => "тог олди",
            LandType::Adir => "адир",
            LandType::Irrigated => "сувли",
        }
    }
}

/// Persisted plantation row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Plantation {
    pub id: i64,
    pub district_id: i64,
    pub farmer_id: Option<i64>,
    pub garden_established_year: Option<i32>,
    pub total_area: f64,
    pub irrigation_area: f64,
    pub not_usable_area: f64,
    pub fertility_score: Option<f64>,
    pub land_type: LandType,
    pub is_fertile: bool,
    pub fenced: bool,
    pub irrigation_systems_count: i32,
    pub pump_station_count: i32,
    pub reservoir_count: i32,
    pub is_checked: bool,
    pub is_deleting: bool,
    pub prev_data: Value,
    pub updated_at: DateTime<Utc>,
}

/// Row of the plantation list view
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlantationSummary {
    pub id: i64,
    pub garden_established_year: Option<i32>,
    pub district_name: String,
    pub region_name: String,
    pub total_area: f64,
    pub is_deleting: bool,
    pub is_checked: bool,
    pub prev_data: Value,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Coordinate {
    pub id: i64,
    #[serde(skip_serializing)]
    pub plantation_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlantationImage {
    pub id: i64,
    #[serde(skip_serializing)]
    pub plantation_id: i64,
    pub image: String,
}

/// Fruit area row joined with fruit, variety and rootstock names
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FruitArea {
    pub id: i64,
    #[serde(skip_serializing)]
    pub plantation_id: i64,
    #[serde(rename = "fruit")]
    pub fruit_id: i64,
    pub fruit_name: String,
    #[serde(rename = "variety")]
    pub variety_id: Option<i64>,
    pub variety_name: Option<String>,
    #[serde(rename = "rootstock")]
    pub rootstock_id: Option<i64>,
    pub rootstock_name: Option<String>,
    pub planted_year: i32,
    pub area: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoordinateInput {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FruitAreaInput {
    pub fruit: i64,
    #[serde(default)]
    pub variety: Option<i64>,
    #[serde(default)]
    pub rootstock: Option<i64>,
    pub planted_year: i32,
    pub area: f64,
}

fn default_true() -> bool {
    true
}

/// Composite submission for create and full replacement
#[derive(Debug, Clone, Deserialize)]
pub struct PlantationInput {
    pub district: i64,
    #[serde(default)]
    pub farmer: Option<i64>,
    #[serde(default)]
    pub garden_established_year: Option<i32>,
    pub total_area: f64,
    #[serde(default)]
    pub irrigation_area: f64,
    #[serde(default)]
    pub not_usable_area: f64,
    #[serde(default)]
    pub fertility_score: Option<f64>,
    pub land_type: LandType,
    #[serde(default = "default_true")]
    pub is_fertile: bool,
    #[serde(default)]
    pub fenced: bool,
    #[serde(default)]
    pub irrigation_systems_count: i32,
    #[serde(default)]
    pub pump_station_count: i32,
    #[serde(default)]
    pub reservoir_count: i32,
    #[serde(default)]
    pub is_checked: Option<bool>,
    #[serde(default)]
    pub is_deleting: bool,

    #[serde(default)]
    pub coordinates: Vec<CoordinateInput>,
    #[serde(default)]
    pub fruit_areas: Vec<FruitAreaInput>,
    #[serde(default)]
    pub images: Vec<String>,

    // Written on create only
    #[serde(default)]
    pub investment: Option<InvestmentFields>,
    #[serde(default)]
    pub reservoir: Option<ReservoirFields>,
    #[serde(default)]
    pub trellis: Option<TrellisFields>,
}

/// Partial update; absent keys keep their stored value, explicit nulls clear nullable fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlantationPatch {
    #[serde(default)]
    pub district: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub farmer: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub garden_established_year: Option<Option<i32>>,
    #[serde(default)]
    pub total_area: Option<f64>,
    #[serde(default)]
    pub irrigation_area: Option<f64>,
    #[serde(default)]
    pub not_usable_area: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub fertility_score: Option<Option<f64>>,
    #[serde(default)]
    pub land_type: Option<LandType>,
    #[serde(default)]
    pub is_fertile: Option<bool>,
    #[serde(default)]
    pub fenced: Option<bool>,
    #[serde(default)]
    pub irrigation_systems_count: Option<i32>,
    #[serde(default)]
    pub pump_station_count: Option<i32>,
    #[serde(default)]
    pub reservoir_count: Option<i32>,
    #[serde(default)]
    pub is_checked: Option<bool>,
    #[serde(default)]
    pub is_deleting: Option<bool>,

    #[serde(default)]
    pub coordinates: Option<Vec<CoordinateInput>>,
    #[serde(default)]
    pub fruit_areas: Option<Vec<FruitAreaInput>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

// Distinguishes `"key": null` (Some(None)) from a missing key (None)
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_defaults() {
        let input: PlantationInput = serde_json::from_value(json!({
            "district": 1,
            "total_area": 10.0,
            "land_type": "адир"
        }))
        .unwrap();

        assert_eq!(input.irrigation_area, 0.0);
        assert!(input.is_fertile);
        assert!(!input.fenced);
        assert!(input.is_checked.is_none());
        assert!(input.fruit_areas.is_empty());
        assert_eq!(input.land_type, LandType::Adir);
    }

    #[test]
    fn patch_distinguishes_null_from_missing() {
        let patch: PlantationPatch = serde_json::from_value(json!({
            "farmer": null,
            "total_area": 20.0
        }))
        .unwrap();

        assert_eq!(patch.farmer, Some(None));
        assert_eq!(patch.fertility_score, None);
        assert_eq!(patch.total_area, Some(20.0));
        assert!(patch.coordinates.is_none());
    }

    #[test]
    fn land_type_round_trips_through_label() {
        let value = serde_json::to_value(LandType::Foothill).unwrap();
        assert_eq!(value, json!("тог олди"));
        assert_eq!(LandType::Foothill.as_str(), "тог олди");
    }
}
