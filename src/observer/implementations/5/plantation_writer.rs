// Ring 5: Database - persist the plantation and its owned rows
use async_trait::async_trait;

use crate::database::repository::plantation as plantations;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

pub struct PlantationWriter;

#[async_trait]
impl Observer for PlantationWriter {
    fn name(&self) -> &'static str {
        "PlantationWriter"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Database
    }

    fn applies_to_operation(&self, _op: Operation) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if ctx.operation == Operation::Delete {
            let id = ctx.target_id()?;
            plantations::delete_cascade(ctx.conn(), id).await?;
            tracing::info!("Deleted plantation {} and its owned rows", id);
            ctx.saved_id = Some(id);
            return Ok(());
        }

        let draft = ctx.draft.take().ok_or_else(|| ObserverError::PipelineError("Nothing to persist".into()))?;
        let review = ctx
            .review
            .take()
            .ok_or_else(|| ObserverError::PipelineError("Review state was not resolved".into()))?;

        let id = match ctx.operation {
            Operation::Create => plantations::insert(ctx.conn(), &draft.record, &review).await?,
            _ => {
                let id = ctx.target_id()?;
                plantations::update(ctx.conn(), id, &draft.record, &review).await?;
                id
            }
        };

        if let Some(coordinates) = &draft.coordinates {
            plantations::replace_coordinates(ctx.conn(), id, coordinates).await?;
        }
        if let Some(fruit_areas) = &draft.fruit_areas {
            plantations::replace_fruit_areas(ctx.conn(), id, fruit_areas).await?;
        }
        if let Some(images) = &draft.images {
            plantations::replace_images(ctx.conn(), id, images).await?;
        }

        if ctx.operation == Operation::Create {
            if let Some(investment) = &draft.investment {
                plantations::insert_investment(ctx.conn(), id, investment).await?;
            }
            if let Some(reservoir) = &draft.reservoir {
                plantations::insert_reservoir(ctx.conn(), id, reservoir).await?;
            }
            if let Some(trellis) = &draft.trellis {
                plantations::insert_trellis(ctx.conn(), id, trellis).await?;
            }
        }

        tracing::info!(
            "Saved plantation {} ({:?}), is_checked={}",
            id,
            ctx.operation,
            review.is_checked
        );

        ctx.saved_id = Some(id);
        Ok(())
    }
}
