use std::time::Instant;

use sqlx::{PgConnection, Postgres, Transaction};

use crate::database::models::{
    CoordinateInput, FruitAreaInput, InvestmentFields, Plantation, PlantationInput, PlantationPatch,
    ReservoirFields, TrellisFields,
};
use crate::database::{PlantationRecord, RecordDiff, ReviewState};
use crate::middleware::AuthUser;
use crate::observer::error::{ObserverError, ObserverWarning};
use crate::observer::traits::{ObserverRing, Operation};

/// What the caller sent for this write
#[derive(Debug)]
pub enum Submission {
    /// Create or full replacement; omitted collections mean empty
    Full(Box<PlantationInput>),
    /// Partial update; omitted fields and collections are kept
    Partial(Box<PlantationPatch>),
    /// Delete carries no body
    Empty,
}

/// The plantation as it will look after the write
#[derive(Debug, Clone)]
pub struct PlantationDraft {
    pub record: PlantationRecord,
    pub requested_checked: Option<bool>,
    /// `None` keeps the stored collection
    pub coordinates: Option<Vec<CoordinateInput>>,
    pub fruit_areas: Option<Vec<FruitAreaInput>>,
    pub images: Option<Vec<String>>,
    /// Sum of fruit areas that will exist after the write
    pub fruit_area_total: f64,
    pub investment: Option<InvestmentFields>,
    pub reservoir: Option<ReservoirFields>,
    pub trellis: Option<TrellisFields>,
}

impl PlantationDraft {
    pub fn from_input(input: PlantationInput) -> Self {
        let record = PlantationRecord {
            district_id: input.district,
            farmer_id: input.farmer,
            garden_established_year: input.garden_established_year,
            total_area: input.total_area,
            irrigation_area: input.irrigation_area,
            not_usable_area: input.not_usable_area,
            fertility_score: input.fertility_score,
            land_type: input.land_type,
            is_fertile: input.is_fertile,
            fenced: input.fenced,
            irrigation_systems_count: input.irrigation_systems_count,
            pump_station_count: input.pump_station_count,
            reservoir_count: input.reservoir_count,
            is_deleting: input.is_deleting,
        };

        Self {
            record,
            requested_checked: input.is_checked,
            fruit_area_total: input.fruit_areas.iter().map(|fa| fa.area).sum(),
            coordinates: Some(input.coordinates),
            fruit_areas: Some(input.fruit_areas),
            images: Some(input.images),
            investment: input.investment,
            reservoir: input.reservoir,
            trellis: input.trellis,
        }
    }

    /// Merge a partial update over the stored row. The fruit-area total is
    /// taken from the patch when it carries the collection, otherwise from
    /// `stored_fruit_total`.
    pub fn from_patch(existing: &Plantation, patch: PlantationPatch, stored_fruit_total: f64) -> Self {
        let stored = PlantationRecord::from(existing);
        let record = PlantationRecord {
            district_id: patch.district.unwrap_or(stored.district_id),
            farmer_id: patch.farmer.unwrap_or(stored.farmer_id),
            garden_established_year: patch.garden_established_year.unwrap_or(stored.garden_established_year),
            total_area: patch.total_area.unwrap_or(stored.total_area),
            irrigation_area: patch.irrigation_area.unwrap_or(stored.irrigation_area),
            not_usable_area: patch.not_usable_area.unwrap_or(stored.not_usable_area),
            fertility_score: patch.fertility_score.unwrap_or(stored.fertility_score),
            land_type: patch.land_type.unwrap_or(stored.land_type),
            is_fertile: patch.is_fertile.unwrap_or(stored.is_fertile),
            fenced: patch.fenced.unwrap_or(stored.fenced),
            irrigation_systems_count: patch.irrigation_systems_count.unwrap_or(stored.irrigation_systems_count),
            pump_station_count: patch.pump_station_count.unwrap_or(stored.pump_station_count),
            reservoir_count: patch.reservoir_count.unwrap_or(stored.reservoir_count),
            is_deleting: patch.is_deleting.unwrap_or(stored.is_deleting),
        };

        let fruit_area_total = match &patch.fruit_areas {
            Some(fruit_areas) => fruit_areas.iter().map(|fa| fa.area).sum(),
            None => stored_fruit_total,
        };

        Self {
            record,
            requested_checked: patch.is_checked,
            coordinates: patch.coordinates,
            fruit_areas: patch.fruit_areas,
            images: patch.images,
            fruit_area_total,
            investment: None,
            reservoir: None,
            trellis: None,
        }
    }
}

/// State flowing through the plantation write pipeline. Owns the
/// transaction every observer reads and writes through.
pub struct ObserverContext {
    pub operation: Operation,
    pub caller: AuthUser,
    /// Target row for update and delete
    pub plantation_id: Option<i64>,
    pub submission: Submission,

    /// Ring 0 output
    pub existing: Option<Plantation>,
    pub draft: Option<PlantationDraft>,

    /// Ring 3 output
    pub diff: Option<RecordDiff>,
    pub review: Option<ReviewState>,

    /// Ring 5 output
    pub saved_id: Option<i64>,

    pub tx: Transaction<'static, Postgres>,

    pub start_time: Instant,
    pub current_ring: Option<ObserverRing>,

    pub errors: Vec<ObserverError>,
    pub warnings: Vec<ObserverWarning>,
}

impl ObserverContext {
    pub fn new(
        operation: Operation,
        caller: AuthUser,
        plantation_id: Option<i64>,
        submission: Submission,
        tx: Transaction<'static, Postgres>,
    ) -> Self {
        Self {
            operation,
            caller,
            plantation_id,
            submission,
            existing: None,
            draft: None,
            diff: None,
            review: None,
            saved_id: None,
            tx,
            start_time: Instant::now(),
            current_ring: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Connection of the surrounding transaction
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Target id, required for update and delete
    pub fn target_id(&self) -> Result<i64, ObserverError> {
        self.plantation_id
            .ok_or_else(|| ObserverError::PipelineError(format!("{:?} requires a plantation id", self.operation)))
    }

    /// Draft prepared by ring 0
    pub fn draft(&self) -> Result<&PlantationDraft, ObserverError> {
        self.draft
            .as_ref()
            .ok_or_else(|| ObserverError::PipelineError("Plantation draft was not prepared".to_string()))
    }

    pub fn add_warning(&mut self, warning: ObserverWarning) {
        self.warnings.push(warning);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn execution_time(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use crate::database::models::LandType;

    fn stored() -> Plantation {
        Plantation {
            id: 9,
            district_id: 2,
            farmer_id: Some(4),
            garden_established_year: Some(2012),
            total_area: 10.0,
            irrigation_area: 3.0,
            not_usable_area: 1.0,
            fertility_score: Some(60.0),
            land_type: LandType::Adir,
            is_fertile: true,
            fenced: false,
            irrigation_systems_count: 1,
            pump_station_count: 0,
            reservoir_count: 0,
            is_checked: true,
            is_deleting: false,
            prev_data: json!({}),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn patch_keeps_omitted_fields_and_stored_fruit_total() {
        let patch: PlantationPatch = serde_json::from_value(json!({ "total_area": 20.0 })).unwrap();
        let draft = PlantationDraft::from_patch(&stored(), patch, 4.0);

        assert_eq!(draft.record.total_area, 20.0);
        assert_eq!(draft.record.irrigation_area, 3.0);
        assert_eq!(draft.record.farmer_id, Some(4));
        assert_eq!(draft.fruit_area_total, 4.0);
        assert!(draft.fruit_areas.is_none());
        assert!(draft.requested_checked.is_none());
    }

    #[test]
    fn patch_null_clears_nullable_field() {
        let patch: PlantationPatch = serde_json::from_value(json!({ "farmer": null })).unwrap();
        let draft = PlantationDraft::from_patch(&stored(), patch, 0.0);
        assert_eq!(draft.record.farmer_id, None);
    }

    #[test]
    fn patch_with_fruit_areas_uses_submitted_total() {
        let patch: PlantationPatch = serde_json::from_value(json!({
            "fruit_areas": [
                { "fruit": 1, "planted_year": 2020, "area": 2.5 },
                { "fruit": 1, "planted_year": 2021, "area": 1.5 }
            ]
        }))
        .unwrap();
        let draft = PlantationDraft::from_patch(&stored(), patch, 9.0);
        assert_eq!(draft.fruit_area_total, 4.0);
    }

    #[test]
    fn full_input_replaces_every_collection() {
        let input: PlantationInput = serde_json::from_value(json!({
            "district": 2,
            "total_area": 10.0,
            "land_type": "сувли"
        }))
        .unwrap();
        let draft = PlantationDraft::from_input(input);
        assert_eq!(draft.coordinates.as_ref().map(Vec::len), Some(0));
        assert_eq!(draft.images.as_ref().map(Vec::len), Some(0));
        assert_eq!(draft.fruit_area_total, 0.0);
    }
}
