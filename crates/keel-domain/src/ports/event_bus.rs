//! Event Bus Port
//!
//! Defines the contract for the synchronous event dispatcher the navigator
//! posts to.
//!
//! ## Usage
//!
//! ```no_run
//! use keel_domain::ports::EventBus;
//! use keel_domain::DomainEvent;
//! use std::sync::Arc;
//!
//! fn watch(bus: &dyn EventBus) {
//!     bus.register(Arc::new(|event: &DomainEvent| {
//!         if let Some(forward) = event.as_forward() {
//!             println!("now at {}", forward.new.id());
//!         }
//!     }));
//! }
//! ```

use crate::events::DomainEvent;
use std::fmt;
use std::sync::Arc;

/// Registration handle returned by [`EventBus::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a raw id
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Receives events posted to an [`EventBus`]
pub trait EventListener: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &DomainEvent);
}

impl<F> EventListener for F
where
    F: Fn(&DomainEvent) + Send + Sync,
{
    fn on_event(&self, event: &DomainEvent) {
        self(event);
    }
}

/// Event dispatcher interface
///
/// Delivery is synchronous: `post` returns once every listener registered
/// at the time of the call has seen the event.
pub trait EventBus: Send + Sync {
    /// Deliver an event to all registered listeners
    fn post(&self, event: DomainEvent);

    /// Register a listener
    fn register(&self, listener: Arc<dyn EventListener>) -> ListenerId;

    /// Unregister a listener, returning whether it was registered
    fn unregister(&self, id: ListenerId) -> bool;

    /// Check if anyone is listening
    fn has_listeners(&self) -> bool;
}

/// Shared event bus for dependency injection
pub type SharedEventBus = Arc<dyn EventBus>;
