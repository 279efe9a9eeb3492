// Ring 2: Security - caller scope and referenced rows
use async_trait::async_trait;

use crate::database::repository::{farmer as farmers, reference};
use crate::error::FieldErrors;
use crate::filter::Visibility;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

pub struct ReferenceCheckObserver;

#[async_trait]
impl Observer for ReferenceCheckObserver {
    fn name(&self) -> &'static str {
        "ReferenceCheckObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Security
    }

    fn applies_to_operation(&self, _op: Operation) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let visibility = Visibility::for_caller(&ctx.caller);

        let Some(draft) = ctx.draft.clone() else {
            return Ok(());
        };
        let record = &draft.record;

        if reference::district(ctx.conn(), record.district_id).await?.is_none() {
            return Err(ObserverError::NotFound(format!("District {} not found", record.district_id)));
        }
        if !visibility.allows(record.district_id) {
            return Err(ObserverError::PermissionDenied(format!(
                "Cannot write plantations in district {}",
                record.district_id
            )));
        }

        let mut errors = FieldErrors::new();

        if let Some(farmer_id) = record.farmer_id {
            if !farmers::exists(ctx.conn(), farmer_id).await? {
                return Err(ObserverError::NotFound(format!("Farmer {} not found", farmer_id)));
            }
            let linked = farmers::linked_plantation(ctx.conn(), farmer_id).await?;
            if matches!(linked, Some(other) if Some(other) != ctx.plantation_id) {
                errors
                    .entry("farmer".to_string())
                    .or_default()
                    .push(format!("Farmer {} is already linked to another plantation", farmer_id));
            }
        }

        for (i, fa) in draft.fruit_areas.iter().flatten().enumerate() {
            if !reference::fruit_exists(ctx.conn(), fa.fruit).await? {
                return Err(ObserverError::NotFound(format!("Fruit {} not found", fa.fruit)));
            }

            if let Some(variety) = fa.variety {
                match reference::variety_fruit(ctx.conn(), variety).await? {
                    None => return Err(ObserverError::NotFound(format!("Variety {} not found", variety))),
                    Some(fruit) if fruit != fa.fruit => {
                        errors
                            .entry(format!("fruit_areas[{}].variety", i))
                            .or_default()
                            .push(format!("Variety {} does not belong to fruit {}", variety, fa.fruit));
                    }
                    Some(_) => {}
                }
            }

            if let Some(rootstock) = fa.rootstock {
                match reference::rootstock_fruit(ctx.conn(), rootstock).await? {
                    None => return Err(ObserverError::NotFound(format!("Rootstock {} not found", rootstock))),
                    Some(fruit) if fruit != fa.fruit => {
                        errors
                            .entry(format!("fruit_areas[{}].rootstock", i))
                            .or_default()
                            .push(format!("Rootstock {} does not belong to fruit {}", rootstock, fa.fruit));
                    }
                    Some(_) => {}
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ObserverError::ValidationError(errors))
        }
    }
}
