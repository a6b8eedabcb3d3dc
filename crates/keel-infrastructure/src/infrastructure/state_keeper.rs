//! In-memory state keeper
//!
//! Keeps saved state for the lifetime of the process. Useful for tests and
//! for hosts that recreate their views without restarting.

use dashmap::DashMap;
use keel_domain::error::Result;
use keel_domain::ports::StateKeeper;
use std::sync::Arc;
use tracing::trace;

/// State keeper backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryStateKeeper {
    entries: DashMap<String, serde_json::Value>,
}

impl InMemoryStateKeeper {
    /// Create an empty keeper
    pub fn new() -> Self {
        Self::default()
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of saved entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is saved
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything saved under `key`
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

impl StateKeeper for InMemoryStateKeeper {
    fn save_state(&self, key: &str, state: serde_json::Value) -> Result<()> {
        trace!(key, "Saving state");
        self.entries.insert(key.to_string(), state);
        Ok(())
    }

    fn retrieve_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }
}
