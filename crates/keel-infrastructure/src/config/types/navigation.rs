//! Navigation configuration types

use crate::constants::DEFAULT_HISTORY_GC_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Navigation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Arena size above which unreachable locations are collected
    pub history_gc_threshold: usize,

    /// Dump the history chain at debug level after every transition
    pub log_history: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            history_gc_threshold: DEFAULT_HISTORY_GC_THRESHOLD,
            log_history: false,
        }
    }
}
