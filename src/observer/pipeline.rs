use std::collections::BTreeMap;
use std::time::Instant;

use once_cell::sync::Lazy;
use tokio::time::timeout;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::implementations::{
    AreaValidationObserver, ChangeTrackingObserver, PlantationLoader, PlantationWriter, ReferenceCheckObserver,
};
use crate::observer::traits::{Observer, ObserverRing};

static PLANTATION_WRITES: Lazy<ObserverPipeline> = Lazy::new(|| {
    let mut pipeline = ObserverPipeline::new();
    pipeline.register_observer(Box::new(PlantationLoader));
    pipeline.register_observer(Box::new(AreaValidationObserver));
    pipeline.register_observer(Box::new(ReferenceCheckObserver));
    pipeline.register_observer(Box::new(ChangeTrackingObserver));
    pipeline.register_observer(Box::new(PlantationWriter));
    pipeline
});

/// Pipeline every plantation create, update and delete runs through
pub fn plantation_writes() -> &'static ObserverPipeline {
    &PLANTATION_WRITES
}

/// Executes registered observers in ring order, stopping after the first
/// ring that reports errors
pub struct ObserverPipeline {
    observers: BTreeMap<ObserverRing, Vec<Box<dyn Observer>>>,
}

impl ObserverPipeline {
    pub fn new() -> Self {
        Self {
            observers: BTreeMap::new(),
        }
    }

    pub fn register_observer(&mut self, observer: Box<dyn Observer>) {
        let ring = observer.ring();
        let name = observer.name();
        let observers = self.observers.entry(ring).or_default();
        observers.push(observer);
        observers.sort_by_key(|o| o.priority());

        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    /// Run the pipeline and hand the context back for commit. On error the
    /// context is dropped, which rolls the transaction back.
    pub async fn execute(&self, mut ctx: ObserverContext) -> Result<ObserverContext, ObserverError> {
        let rings = ObserverRing::for_operation(ctx.operation);

        tracing::info!(
            "Observer pipeline starting: operation={:?}, plantation={:?}, user={}",
            ctx.operation,
            ctx.plantation_id,
            ctx.caller.username
        );

        for ring in rings {
            ctx.current_ring = Some(ring);

            if !self.execute_ring(ring, &mut ctx).await {
                tracing::warn!("Observer pipeline stopped at ring {:?} due to errors", ring);
                let errors = std::mem::take(&mut ctx.errors);
                return Err(ObserverError::merge(errors)
                    .unwrap_or_else(|| ObserverError::PipelineError("Pipeline stopped without an error".into())));
            }
        }

        for warning in &ctx.warnings {
            tracing::info!("Observer {} warning: {}", warning.observer, warning.message);
        }

        tracing::info!(
            "Observer pipeline finished: operation={:?}, plantation={:?} in {:?}",
            ctx.operation,
            ctx.saved_id,
            ctx.execution_time()
        );

        Ok(ctx)
    }

    /// Returns false when the ring collected errors
    async fn execute_ring(&self, ring: ObserverRing, ctx: &mut ObserverContext) -> bool {
        let Some(observers) = self.observers.get(&ring) else {
            tracing::trace!("No observers registered for ring {:?}", ring);
            return true;
        };

        for observer in observers {
            if !observer.applies_to_operation(ctx.operation) {
                tracing::trace!(
                    "Observer {} skipped - doesn't apply to operation {:?}",
                    observer.name(),
                    ctx.operation
                );
                continue;
            }

            let observer_start = Instant::now();
            let result = timeout(observer.timeout(), observer.execute(ctx)).await;
            let execution_time = observer_start.elapsed();

            match result {
                Ok(Ok(())) => {
                    tracing::debug!("Observer: {} completed in {:?}", observer.name(), execution_time);
                }
                Ok(Err(error)) => {
                    tracing::warn!("Observer: {} failed in {:?}: {}", observer.name(), execution_time, error);
                    ctx.errors.push(error);
                }
                Err(_elapsed) => {
                    tracing::error!("Observer: {} timed out after {:?}", observer.name(), observer.timeout());
                    ctx.errors.push(ObserverError::TimeoutError(format!(
                        "Observer {} timed out after {:?}",
                        observer.name(),
                        observer.timeout()
                    )));
                }
            }
        }

        !ctx.has_errors()
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::new()
    }
}
