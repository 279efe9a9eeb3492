// Ring 3: Business - tracked-field diff and review flag
use async_trait::async_trait;

use crate::database::{resolve_review_state, PlantationRecord, RecordDiff};
use crate::observer::context::ObserverContext;
use crate::observer::error::{ObserverError, ObserverWarning};
use crate::observer::traits::{Observer, ObserverRing, Operation};

pub struct ChangeTrackingObserver;

#[async_trait]
impl Observer for ChangeTrackingObserver {
    fn name(&self) -> &'static str {
        "ChangeTrackingObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let draft = ctx.draft()?;
        let requested = draft.requested_checked;

        let (stored_checked, diff) = match &ctx.existing {
            Some(existing) => {
                let stored = PlantationRecord::from(existing);
                (Some(existing.is_checked), RecordDiff::between(&stored, &draft.record))
            }
            None => (None, RecordDiff::default()),
        };

        let review = resolve_review_state(stored_checked, requested, &diff);

        if !diff.is_empty() {
            let fields: Vec<&str> = diff.changes.iter().map(|c| c.field.name()).collect();
            tracing::info!(
                "Plantation {:?} tracked fields changed: {}",
                ctx.plantation_id,
                fields.join(", ")
            );
            if review.is_checked {
                ctx.add_warning(ObserverWarning::new(
                    self.name(),
                    format!("approval cleared pending changes to {}", fields.join(", ")),
                ));
            }
        }

        ctx.diff = Some(diff);
        ctx.review = Some(review);
        Ok(())
    }
}
