use serde_json::{json, Map, Value};

use super::models::{LandType, Plantation};

/// Scalar plantation state that participates in change tracking
#[derive(Debug, Clone, PartialEq)]
pub struct PlantationRecord {
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
    pub is_deleting: bool,
}

impl From<&Plantation> for PlantationRecord {
    fn from(row: &Plantation) -> Self {
        Self {
            district_id: row.district_id,
            farmer_id: row.farmer_id,
            garden_established_year: row.garden_established_year,
            total_area: row.total_area,
            irrigation_area: row.irrigation_area,
            not_usable_area: row.not_usable_area,
            fertility_score: row.fertility_score,
            land_type: row.land_type,
            is_fertile: row.is_fertile,
            fenced: row.fenced,
            irrigation_systems_count: row.irrigation_systems_count,
            pump_station_count: row.pump_station_count,
            reservoir_count: row.reservoir_count,
            is_deleting: row.is_deleting,
        }
    }
}

/// Fields compared between the stored and the incoming plantation.
/// `is_checked`, `prev_data`, `updated_at` and `id` are deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrackedField {
    GardenEstablishedYear,
    District,
    Farmer,
    TotalArea,
    IrrigationArea,
    NotUsableArea,
    FertilityScore,
    LandType,
    IsFertile,
    Fenced,
    IrrigationSystemsCount,
    PumpStationCount,
    ReservoirCount,
    IsDeleting,
}

impl TrackedField {
    pub const ALL: [TrackedField; 14] = [
        TrackedField::GardenEstablishedYear,
        TrackedField::District,
        TrackedField::Farmer,
        TrackedField::TotalArea,
        TrackedField::IrrigationArea,
        TrackedField::NotUsableArea,
        TrackedField::FertilityScore,
        TrackedField::LandType,
        TrackedField::IsFertile,
        TrackedField::Fenced,
        TrackedField::IrrigationSystemsCount,
        TrackedField::PumpStationCount,
        TrackedField::ReservoirCount,
        TrackedField::IsDeleting,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TrackedField::GardenEstablishedYear => "garden_established_year",
            TrackedField::District => "district",
            TrackedField::Farmer => "farmer",
            TrackedField::TotalArea => "total_area",
            TrackedField::IrrigationArea => "irrigation_area",
            TrackedField::NotUsableArea => "not_usable_area",
            TrackedField::FertilityScore => "fertility_score",
            TrackedField::LandType => "land_type",
            TrackedField::IsFertile => "is_fertile",
            TrackedField::Fenced => "fenced",
            TrackedField::IrrigationSystemsCount => "irrigation_systems_count",
            TrackedField::PumpStationCount => "pump_station_count",
            TrackedField::ReservoirCount => "reservoir_count",
            TrackedField::IsDeleting => "is_deleting",
        }
    }

    /// References compare by identifier, everything else by value
    pub fn differs(&self, old: &PlantationRecord, new: &PlantationRecord) -> bool {
        match self {
            TrackedField::GardenEstablishedYear => old.garden_established_year != new.garden_established_year,
            TrackedField::District => old.district_id != new.district_id,
            TrackedField::Farmer => old.farmer_id != new.farmer_id,
            TrackedField::TotalArea => old.total_area != new.total_area,
            TrackedField::IrrigationArea => old.irrigation_area != new.irrigation_area,
            TrackedField::NotUsableArea => old.not_usable_area != new.not_usable_area,
            TrackedField::FertilityScore => old.fertility_score != new.fertility_score,
            TrackedField::LandType => old.land_type != new.land_type,
            TrackedField::IsFertile => old.is_fertile != new.is_fertile,
            TrackedField::Fenced => old.fenced != new.fenced,
            TrackedField::IrrigationSystemsCount => old.irrigation_systems_count != new.irrigation_systems_count,
            TrackedField::PumpStationCount => old.pump_station_count != new.pump_station_count,
            TrackedField::ReservoirCount => old.reservoir_count != new.reservoir_count,
            TrackedField::IsDeleting => old.is_deleting != new.is_deleting,
        }
    }

    pub fn value(&self, record: &PlantationRecord) -> Value {
        match self {
            TrackedField::GardenEstablishedYear => json!(record.garden_established_year),
            TrackedField::District => json!(record.district_id),
            TrackedField::Farmer => json!(record.farmer_id),
            TrackedField::TotalArea => json!(record.total_area),
            TrackedField::IrrigationArea => json!(record.irrigation_area),
            TrackedField::NotUsableArea => json!(record.not_usable_area),
            TrackedField::FertilityScore => json!(record.fertility_score),
            TrackedField::LandType => json!(record.land_type.as_str()),
            TrackedField::IsFertile => json!(record.is_fertile),
            TrackedField::Fenced => json!(record.fenced),
            TrackedField::IrrigationSystemsCount => json!(record.irrigation_systems_count),
            TrackedField::PumpStationCount => json!(record.pump_station_count),
            TrackedField::ReservoirCount => json!(record.reservoir_count),
            TrackedField::IsDeleting => json!(record.is_deleting),
        }
    }
}

/// Field change information for diff tracking
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: TrackedField,
    pub old_value: Value,
    pub new_value: Value,
}

/// Changed tracked fields between two versions of a plantation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDiff {
    pub changes: Vec<FieldChange>,
}

impl RecordDiff {
    pub fn between(old: &PlantationRecord, new: &PlantationRecord) -> Self {
        let changes = TrackedField::ALL
            .iter()
            .filter(|field| field.differs(old, new))
            .map(|field| FieldChange {
                field: *field,
                old_value: field.value(old),
                new_value: field.value(new),
            })
            .collect();

        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changed(&self, field: TrackedField) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }

    /// Snapshot stored in `prev_data`: `{"field": {"old": .., "new": ..}}`
    pub fn to_snapshot(&self) -> Value {
        let map: Map<String, Value> = self
            .changes
            .iter()
            .map(|c| {
                (
                    c.field.name().to_string(),
                    json!({ "old": c.old_value, "new": c.new_value }),
                )
            })
            .collect();
        Value::Object(map)
    }
}

/// Outcome of the review-flag rule for one save
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewState {
    pub is_checked: bool,
    pub prev_data: Value,
}

/// Resolve `is_checked` and `prev_data` for a save.
///
/// `stored_checked` is `None` for a new record. Precedence on update:
/// re-approval (stored false, requested true) wins and clears the snapshot,
/// then any tracked change resets the flag and records the diff, otherwise
/// the requested (or stored) flag is kept with an empty snapshot.
pub fn resolve_review_state(
    stored_checked: Option<bool>,
    requested_checked: Option<bool>,
    diff: &RecordDiff,
) -> ReviewState {
    let empty = Value::Object(Map::new());

    let Some(stored) = stored_checked else {
        return ReviewState { is_checked: false, prev_data: empty };
    };

    let requested = requested_checked.unwrap_or(stored);

    if !stored && requested {
        return ReviewState { is_checked: true, prev_data: empty };
    }

    if !diff.is_empty() {
        return ReviewState { is_checked: false, prev_data: diff.to_snapshot() };
    }

    ReviewState { is_checked: requested, prev_data: empty }
}
