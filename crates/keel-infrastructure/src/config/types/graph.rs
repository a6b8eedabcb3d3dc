//! Graph configuration types

use crate::constants::DEFAULT_MAX_RESOLUTION_DEPTH;
use serde::{Deserialize, Serialize};

/// Injection graph configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Longest resolution chain before `ResolutionDepthExceeded`
    pub max_resolution_depth: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}
