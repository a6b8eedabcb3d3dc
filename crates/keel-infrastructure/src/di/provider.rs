//! Provider
//!
//! One provider per capability key. It fixes the binding the key resolved
//! to, drives the key's cached item through the scope cache and notifies
//! freed listeners when the item is evicted.

use super::binding::{Binding, BindingOrigin, Factory};
use super::scope_cache::{CachedItem, ScopeCache};
use keel_domain::error::Result;
use keel_domain::CapabilityKey;
use std::fmt;
use std::sync::Arc;

/// Callback invoked with the key whose cached item was evicted
pub type FreedListener = Arc<dyn Fn(&CapabilityKey) + Send + Sync>;

/// Evicted item and the listeners to notify once hooks have run
pub(crate) struct Eviction {
    pub(crate) item: CachedItem,
    pub(crate) listeners: Vec<FreedListener>,
}

/// Per-capability lifecycle owner
pub struct Provider {
    binding: Binding,
    listeners: Vec<FreedListener>,
    stale: bool,
}

impl Provider {
    pub(crate) fn new(binding: Binding) -> Self {
        Self {
            binding,
            listeners: Vec::new(),
            stale: false,
        }
    }

    /// Provided capability
    pub fn key(&self) -> &CapabilityKey {
        self.binding.key()
    }

    /// Origin of the binding this provider fixed
    pub fn origin(&self) -> &BindingOrigin {
        self.binding.origin()
    }

    /// Number of freed listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn factory(&self) -> Factory {
        self.binding.factory()
    }

    /// The registry entry changed; rebind before the next construction
    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn rebind(&mut self, binding: Binding) {
        self.binding = binding;
        self.stale = false;
    }

    pub(crate) fn add_listener(&mut self, listener: FreedListener) {
        self.listeners.push(listener);
    }

    pub(crate) fn listeners(&self) -> Vec<FreedListener> {
        self.listeners.clone()
    }

    pub(crate) fn release(&self, cache: &mut ScopeCache) -> Result<Option<Eviction>> {
        Ok(cache.release(self.key())?.map(|item| Eviction {
            item,
            listeners: self.listeners.clone(),
        }))
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("key", self.key())
            .field("origin", self.origin())
            .field("listeners", &self.listeners.len())
            .field("stale", &self.stale)
            .finish()
    }
}
