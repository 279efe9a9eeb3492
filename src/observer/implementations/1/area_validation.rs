// Ring 1: Input Validation - field-level and cross-field area checks
use async_trait::async_trait;
use chrono::{Datelike, Utc};

use crate::error::FieldErrors;
use crate::observer::context::{ObserverContext, PlantationDraft};
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Tolerance for the summed area check only; single-field comparisons
/// mirror the table constraints exactly
const AREA_SUM_EPSILON: f64 = 1e-9;

const EARLIEST_YEAR: i32 = 1900;

pub struct AreaValidationObserver;

#[async_trait]
impl Observer for AreaValidationObserver {
    fn name(&self) -> &'static str {
        "AreaValidationObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let errors = validate_draft(ctx.draft()?, Utc::now().year());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ObserverError::ValidationError(errors))
        }
    }
}

fn push(errors: &mut FieldErrors, field: impl Into<String>, message: impl Into<String>) {
    errors.entry(field.into()).or_default().push(message.into());
}

/// Every violation in the draft, keyed by field
pub fn validate_draft(draft: &PlantationDraft, current_year: i32) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let record = &draft.record;

    for (field, value) in [
        ("total_area", record.total_area),
        ("irrigation_area", record.irrigation_area),
        ("not_usable_area", record.not_usable_area),
    ] {
        if value < 0.0 {
            push(&mut errors, field, "Area must not be negative");
        }
    }

    if record.irrigation_area > record.total_area {
        push(
            &mut errors,
            "irrigation_area",
            "Irrigation area cannot be greater than the total area",
        );
    }

    if let Some(score) = record.fertility_score {
        if !(1.0..=100.0).contains(&score) {
            push(&mut errors, "fertility_score", "Fertility score must be between 1 and 100");
        }
    }

    let occupied = record.irrigation_area + record.not_usable_area + draft.fruit_area_total;
    if occupied > record.total_area + AREA_SUM_EPSILON {
        push(
            &mut errors,
            "total_area",
            format!(
                "Irrigation, not usable and fruit areas together ({}) exceed the total area ({})",
                occupied, record.total_area
            ),
        );
    }

    for (field, value) in [
        ("irrigation_systems_count", record.irrigation_systems_count),
        ("pump_station_count", record.pump_station_count),
        ("reservoir_count", record.reservoir_count),
    ] {
        if value < 0 {
            push(&mut errors, field, "Count must not be negative");
        }
    }

    if let Some(year) = record.garden_established_year {
        if !(EARLIEST_YEAR..=current_year).contains(&year) {
            push(
                &mut errors,
                "garden_established_year",
                format!("Year must be between {} and {}", EARLIEST_YEAR, current_year),
            );
        }
    }

    if let Some(fruit_areas) = &draft.fruit_areas {
        for (i, fa) in fruit_areas.iter().enumerate() {
            if fa.area < 0.0 {
                push(&mut errors, format!("fruit_areas[{}].area", i), "Area must not be negative");
            }
            if !(EARLIEST_YEAR..=current_year + 1).contains(&fa.planted_year) {
                push(
                    &mut errors,
                    format!("fruit_areas[{}].planted_year", i),
                    format!("Year must be between {} and {}", EARLIEST_YEAR, current_year + 1),
                );
            }
        }
    }

    if let Some(coordinates) = &draft.coordinates {
        for (i, c) in coordinates.iter().enumerate() {
            if !(-90.0..=90.0).contains(&c.latitude) {
                push(&mut errors, format!("coordinates[{}].latitude", i), "Latitude must be between -90 and 90");
            }
            if !(-180.0..=180.0).contains(&c.longitude) {
                push(
                    &mut errors,
                    format!("coordinates[{}].longitude", i),
                    "Longitude must be between -180 and 180",
                );
            }
        }
    }

    if let Some(images) = &draft.images {
        for (i, image) in images.iter().enumerate() {
            if image.trim().is_empty() {
                push(&mut errors, format!("images[{}]", i), "Image reference must not be empty");
            }
        }
    }

    if let Some(investment) = &draft.investment {
        if investment.investment_amount.is_sign_negative() {
            push(&mut errors, "investment.investment_amount", "Investment amount must not be negative");
        }
    }
    if let Some(reservoir) = &draft.reservoir {
        if matches!(reservoir.reservoir_volume, Some(v) if v < 0.0) {
            push(&mut errors, "reservoir.reservoir_volume", "Reservoir volume must not be negative");
        }
    }
    if let Some(trellis) = &draft.trellis {
        if trellis.trellis_installed_area < 0.0 {
            push(&mut errors, "trellis.trellis_installed_area", "Installed area must not be negative");
        }
        if trellis.trellis_count < 0 {
            push(&mut errors, "trellis.trellis_count", "Trellis count must not be negative");
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::PlantationInput;
    use serde_json::{json, Value};

    fn draft(body: Value) -> PlantationDraft {
        let input: PlantationInput = serde_json::from_value(body).unwrap();
        PlantationDraft::from_input(input)
    }

    fn base(fruit_area: f64) -> Value {
        json!({
            "district": 1,
            "total_area": 10.0,
            "irrigation_area": 3.0,
            "not_usable_area": 1.0,
            "land_type": "сувли",
            "fruit_areas": [{ "fruit": 1, "planted_year": 2020, "area": fruit_area }]
        })
    }

    #[test]
    fn accepts_areas_that_fit() {
        assert!(validate_draft(&draft(base(4.0)), 2024).is_empty());
    }

    #[test]
    fn accepts_exact_fit() {
        assert!(validate_draft(&draft(base(6.0)), 2024).is_empty());
    }

    #[test]
    fn rejects_area_sum_over_total() {
        let errors = validate_draft(&draft(base(8.0)), 2024);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("total_area"));
    }

    #[test]
    fn rejects_fertility_out_of_range() {
        let mut body = base(4.0);
        body["fertility_score"] = json!(150);
        let errors = validate_draft(&draft(body), 2024);
        assert!(errors.contains_key("fertility_score"));

        let mut body = base(4.0);
        body["fertility_score"] = json!(0.5);
        assert!(validate_draft(&draft(body), 2024).contains_key("fertility_score"));
    }

    #[test]
    fn rejects_irrigation_over_total() {
        let mut body = base(0.0);
        body["irrigation_area"] = json!(12.0);
        let errors = validate_draft(&draft(body), 2024);
        assert!(errors.contains_key("irrigation_area"));
        assert!(errors.contains_key("total_area"));
    }

    #[test]
    fn irrigation_is_compared_exactly_against_total() {
        let mut body = base(0.0);
        body["not_usable_area"] = json!(0.0);
        body["irrigation_area"] = json!(10.0000000001);
        let errors = validate_draft(&draft(body), 2024);
        assert!(errors.contains_key("irrigation_area"));

        let mut body = base(0.0);
        body["not_usable_area"] = json!(0.0);
        body["irrigation_area"] = json!(10.0);
        assert!(validate_draft(&draft(body), 2024).is_empty());
    }

    #[test]
    fn reports_every_violation_together() {
        let body = json!({
            "district": 1,
            "total_area": -1.0,
            "land_type": "адир",
            "pump_station_count": -2,
            "coordinates": [{ "latitude": 95.0, "longitude": 10.0 }],
            "images": [""],
            "fruit_areas": [{ "fruit": 1, "planted_year": 1800, "area": -1.0 }]
        });
        let errors = validate_draft(&draft(body), 2024);
        for key in [
            "total_area",
            "pump_station_count",
            "coordinates[0].latitude",
            "images[0]",
            "fruit_areas[0].planted_year",
            "fruit_areas[0].area",
        ] {
            assert!(errors.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn tolerates_float_rounding() {
        let body = json!({
            "district": 1,
            "total_area": 0.3,
            "irrigation_area": 0.1,
            "land_type": "адир",
            "fruit_areas": [{ "fruit": 1, "planted_year": 2020, "area": 0.2 }]
        });
        assert!(validate_draft(&draft(body), 2024).is_empty());
    }
}
