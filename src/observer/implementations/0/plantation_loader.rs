// Ring 0: Data Preparation - loads the stored plantation and builds the draft
use async_trait::async_trait;

use crate::database::models::Plantation;
use crate::database::repository::plantation as plantations;
use crate::filter::Visibility;
use crate::observer::context::{ObserverContext, PlantationDraft, Submission};
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

pub struct PlantationLoader;

#[async_trait]
impl Observer for PlantationLoader {
    fn name(&self) -> &'static str {
        "PlantationLoader"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::DataPreparation
    }

    fn applies_to_operation(&self, _op: Operation) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.operation != Operation::Create {
            let id = ctx.target_id()?;
            let existing = plantations::fetch_for_update(ctx.conn(), id)
                .await?
                .ok_or_else(|| ObserverError::NotFound(format!("Plantation {} not found", id)))?;
            // Out-of-district rows are refused before any body validation runs
            ensure_in_scope(Visibility::for_caller(&ctx.caller), &existing)?;
            ctx.existing = Some(existing);
        }

        let submission = std::mem::replace(&mut ctx.submission, Submission::Empty);
        ctx.draft = match submission {
            Submission::Full(input) => Some(PlantationDraft::from_input(*input)),
            Submission::Partial(patch) => {
                let id = ctx.target_id()?;
                let stored_fruit_total = match patch.fruit_areas {
                    Some(_) => 0.0,
                    None => plantations::fruit_area_total(ctx.conn(), id).await?,
                };
                let existing = ctx
                    .existing
                    .as_ref()
                    .ok_or_else(|| ObserverError::PipelineError("Partial update without a stored row".into()))?;
                Some(PlantationDraft::from_patch(existing, *patch, stored_fruit_total))
            }
            Submission::Empty if ctx.operation == Operation::Delete => None,
            Submission::Empty => {
                return Err(ObserverError::PipelineError(format!(
                    "{:?} requires a submission",
                    ctx.operation
                )))
            }
        };

        Ok(())
    }
}

fn ensure_in_scope(visibility: Visibility, existing: &Plantation) -> Result<(), ObserverError> {
    if visibility.allows(existing.district_id) {
        return Ok(());
    }
    Err(ObserverError::PermissionDenied(format!(
        "Plantation {} belongs to another district",
        existing.id
    )))
}
