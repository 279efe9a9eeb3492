// Observer system for plantation writes: ordered rings sharing one transaction

pub mod context;
pub mod error;
pub mod implementations;
pub mod pipeline;
pub mod traits;

pub use context::{ObserverContext, PlantationDraft, Submission};
pub use error::{ObserverError, ObserverWarning};
pub use pipeline::{plantation_writes, ObserverPipeline};
pub use traits::{Observer, ObserverRing, Operation};
