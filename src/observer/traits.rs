use async_trait::async_trait;
use std::time::Duration;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;

/// Observer rings with semantic meaning, executed in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ObserverRing {
    DataPreparation = 0, // Load existing data, merge updates
    InputValidation = 1, // Field-level checks
    Security = 2,        // Access control, referenced rows
    Business = 3,        // Change tracking, review flag
    Enrichment = 4,      // Computed fields, defaults
    Database = 5,        // SQL execution
    PostDatabase = 6,    // Immediate processing after database operations
}

impl ObserverRing {
    pub const ALL: [ObserverRing; 7] = [
        ObserverRing::DataPreparation,
        ObserverRing::InputValidation,
        ObserverRing::Security,
        ObserverRing::Business,
        ObserverRing::Enrichment,
        ObserverRing::Database,
        ObserverRing::PostDatabase,
    ];

    /// Rings that run for an operation; deletes skip validation and change tracking
    pub fn for_operation(operation: Operation) -> Vec<Self> {
        use ObserverRing::*;

        match operation {
            Operation::Create | Operation::Update => Self::ALL.to_vec(),
            Operation::Delete => vec![DataPreparation, Security, Database, PostDatabase],
        }
    }
}

/// Plantation write operations supported by the observer system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// One step of the plantation write pipeline
#[async_trait]
pub trait Observer: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    /// Which ring this observer belongs to
    fn ring(&self) -> ObserverRing;

    /// Check if observer applies to this operation
    fn applies_to_operation(&self, op: Operation) -> bool;

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    /// Priority within ring (lower numbers execute first)
    fn priority(&self) -> u8 {
        50
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError>;
}
