//! Event Bus Infrastructure
//!
//! Synchronous event bus implementations for the navigation core.

use keel_domain::events::DomainEvent;
use keel_domain::ports::{EventBus, EventListener, ListenerId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

// ============================================================================
// Null Event Bus (Testing)
// ============================================================================

/// Null event bus for testing
///
/// Discards all posted events. Registration succeeds but listeners are
/// never called.
#[derive(Debug, Default)]
pub struct NullEventBus {
    next_id: AtomicU64,
}

impl NullEventBus {
    /// Create a new null event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl EventBus for NullEventBus {
    fn post(&self, _event: DomainEvent) {}

    fn register(&self, _listener: Arc<dyn EventListener>) -> ListenerId {
        ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn unregister(&self, _id: ListenerId) -> bool {
        false
    }

    fn has_listeners(&self) -> bool {
        false
    }
}

// ============================================================================
// In-Process Event Bus (Production)
// ============================================================================

/// In-process synchronous event bus
///
/// Listeners are called in registration order on the posting thread. The
/// listener list is snapshotted before delivery, so listeners may register
/// or unregister (themselves included) while an event is being dispatched;
/// the change applies from the next post.
#[derive(Default)]
pub struct InProcessEventBus {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn EventListener>)>>,
    next_id: AtomicU64,
}

impl InProcessEventBus {
    /// Create a new in-process event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(ListenerId, Arc<dyn EventListener>)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for InProcessEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessEventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus for InProcessEventBus {
    fn post(&self, event: DomainEvent) {
        let snapshot: Vec<Arc<dyn EventListener>> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        trace!(listeners = snapshot.len(), ?event, "Posting event");
        for listener in snapshot {
            listener.on_event(&event);
        }
    }

    fn register(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, listener));
        id
    }

    fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    fn has_listeners(&self) -> bool {
        !self.lock().is_empty()
    }
}
