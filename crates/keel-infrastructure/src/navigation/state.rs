//! Navigation State
//!
//! Shared read handle on the navigation history. Only the
//! [`NavigationManager`](super::NavigationManager) mutates it.

use super::history::NavigationHistory;
use keel_domain::{HistorySnapshot, Location};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Where the application currently is
#[derive(Clone, Default)]
pub struct NavigationState {
    history: Arc<Mutex<NavigationHistory>>,
}

impl NavigationState {
    pub(crate) fn new(history: NavigationHistory) -> Self {
        Self {
            history: Arc::new(Mutex::new(history)),
        }
    }

    /// Current location, `None` meaning no location or about to exit
    pub fn current_location(&self) -> Option<Location> {
        self.lock().current().cloned()
    }

    /// Reachable history, root first
    pub fn chain(&self) -> Vec<Location> {
        self.lock().chain().into_iter().cloned().collect()
    }

    /// Ids of the reachable history, root first
    pub fn snapshot(&self) -> HistorySnapshot {
        self.lock().snapshot()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, NavigationHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for NavigationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NavigationState").field(&*self.lock()).finish()
    }
}
