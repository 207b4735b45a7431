//! Run configuration passed explicitly into the consolidation pipeline

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Immutable inputs that shape one consolidation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationConfig {
    /// Companies whose mutual transactions are eliminated
    pub group_members: GroupMembers,
    /// Allowed absolute net per entity pair; exact by default
    #[serde(default)]
    pub tolerance: Tolerance,
}

impl ConsolidationConfig {
    /// Create a configuration with exact (zero) tolerance
    pub fn new(group_members: GroupMembers) -> Self {
        Self {
            group_members,
            tolerance: Tolerance::exact(),
        }
    }

    /// Replace the mismatch tolerance
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}
