pub mod manager;
pub mod models;
pub mod record;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use record::{resolve_review_state, FieldChange, PlantationRecord, RecordDiff, ReviewState, TrackedField};
