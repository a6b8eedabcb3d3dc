//! Navigator
//!
//! One-shot builder for a single transition. Pins taken on the builder are
//! retained immediately and handed to the manager when the transition is
//! committed; they are released once the destination view reports ready.
//!
//! ```text
//! manager.navigate()
//!     .pin::<dyn Session>(None)?          retained now
//!     .on_settled(|| ...)
//!     .forward("details")?                history moves, live generation pinned, event posted
//!
//! manager.view_ready()?                   generation and pins released, callbacks run
//! ```
//!
//! A navigator dropped or destroyed before committing releases its pins
//! without running the settled callbacks.

use super::manager::{NavigationManager, SettledCallback, Transition};
use keel_domain::error::Result;
use keel_domain::CapabilityKey;
use std::fmt;
use tracing::{error, trace};

/// Builder for one navigation transition
#[must_use = "a navigator does nothing until a transition is committed"]
pub struct Navigator<'a> {
    manager: &'a NavigationManager,
    pins: Vec<CapabilityKey>,
    on_settled: Vec<SettledCallback>,
}

impl<'a> Navigator<'a> {
    pub(crate) fn new(manager: &'a NavigationManager) -> Self {
        Self {
            manager,
            pins: Vec::new(),
            on_settled: Vec::new(),
        }
    }

    /// Resolve and retain `C` for the destination until the transition settles
    ///
    /// On failure the navigator is dropped, releasing everything pinned so far.
    pub fn pin<C: ?Sized + Send + Sync + 'static>(self, qualifier: Option<&str>) -> Result<Self> {
        self.pin_with::<C, _>(qualifier, |_| {})
    }

    /// Like [`Navigator::pin`], running `preparer` on the instance
    pub fn pin_with<C, F>(mut self, qualifier: Option<&str>, preparer: F) -> Result<Self>
    where
        C: ?Sized + Send + Sync + 'static,
        F: FnOnce(&C),
    {
        let lease = self.manager.graph().lease::<C>(qualifier)?;
        preparer(lease.get());
        trace!(key = %lease.key(), "Pinned for destination");
        self.pins.push(lease.into_key());
        Ok(self)
    }

    /// Pin by key
    pub fn pin_key(mut self, key: CapabilityKey) -> Result<Self> {
        self.manager.graph().retain_key(&key)?;
        self.pins.push(key);
        Ok(self)
    }

    /// Run `callback` once the transition settles
    pub fn on_settled<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_settled.push(Box::new(callback));
        self
    }

    /// Keys pinned so far
    pub fn pinned(&self) -> &[CapabilityKey] {
        &self.pins
    }

    /// Navigate forward to `id`
    ///
    /// Returns whether a transition happened.
    pub fn forward(self, id: &str) -> Result<bool> {
        self.commit(Transition::Forward { id: id.to_string() })
    }

    /// Navigate forward to `id`, clearing history up to `clear_up_to` (or entirely with `None`)
    pub fn forward_clearing(self, id: &str, clear_up_to: Option<&str>) -> Result<bool> {
        self.commit(Transition::ForwardClearing {
            id: id.to_string(),
            clear_up_to: clear_up_to.map(str::to_string),
        })
    }

    /// Go back one step
    pub fn back(self) -> Result<bool> {
        self.commit(Transition::Back)
    }

    /// Fast rewind to the nearest ancestor with id `to`, or to the root with `None`
    pub fn back_to(self, to: Option<&str>) -> Result<bool> {
        self.commit(Transition::BackTo {
            to: to.map(str::to_string),
        })
    }

    /// Abandon the navigation, releasing the pins
    pub fn destroy(mut self) -> Result<()> {
        let pins = std::mem::take(&mut self.pins);
        self.manager.graph().release_keys(&pins)
    }

    fn commit(mut self, transition: Transition) -> Result<bool> {
        let pins = std::mem::take(&mut self.pins);
        let callbacks = std::mem::take(&mut self.on_settled);
        self.manager.commit(transition, pins, callbacks)
    }
}

impl Drop for Navigator<'_> {
    fn drop(&mut self) {
        if self.pins.is_empty() {
            return;
        }
        let pins = std::mem::take(&mut self.pins);
        if let Err(error) = self.manager.graph().release_keys(&pins) {
            error!(%error, "Releasing abandoned navigator pins failed");
        }
    }
}

impl fmt::Debug for Navigator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("pins", &self.pins)
            .field("on_settled", &self.on_settled.len())
            .finish()
    }
}
