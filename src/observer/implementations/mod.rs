// Observer implementations organized by rings

// Ring 0: Data Preparation - load the stored row, build the draft
#[path = "0/plantation_loader.rs"]
pub mod plantation_loader;

// Ring 1: Input Validation - field and area checks
#[path = "1/area_validation.rs"]
pub mod area_validation;

// Ring 2: Security - caller scope, referenced rows
#[path = "2/reference_check.rs"]
pub mod reference_check;

// Ring 3: Business - diff and review flag
#[path = "3/change_tracking.rs"]
pub mod change_tracking;

// Ring 5: Database - SQL execution
#[path = "5/plantation_writer.rs"]
pub mod plantation_writer;

pub use area_validation::{validate_draft, AreaValidationObserver};
pub use change_tracking::ChangeTrackingObserver;
pub use plantation_loader::PlantationLoader;
pub use plantation_writer::PlantationWriter;
pub use reference_check::ReferenceCheckObserver;
