//! Scope Cache
//!
//! Owns every cached instance together with its live reference count. All
//! other holders only hold counted references obtained through the graph.

use super::component::{ErasedComponent, Instance, Lifecycle, Stateful};
use keel_domain::error::{Error, Result};
use keel_domain::CapabilityKey;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Cached instance plus its reference count
pub(crate) struct CachedItem {
    pub(crate) instance: Instance,
    pub(crate) lifecycle: Option<Arc<dyn Lifecycle>>,
    pub(crate) stateful: Option<Arc<dyn Stateful>>,
    pub(crate) ref_count: usize,
    /// Keys this instance retained while it was constructed
    pub(crate) held: Vec<CapabilityKey>,
    pub(crate) serial: u64,
}

/// Mapping from capability key to cached instance and reference count
#[derive(Default)]
pub struct ScopeCache {
    items: HashMap<CapabilityKey, CachedItem>,
    next_serial: u64,
}

impl ScopeCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a key has a cached item
    pub fn contains(&self, key: &CapabilityKey) -> bool {
        self.items.contains_key(key)
    }

    /// Live reference count of a key, zero when not cached
    pub fn ref_count(&self, key: &CapabilityKey) -> usize {
        self.items.get(key).map_or(0, |item| item.ref_count)
    }

    /// Identity of the cached instance; a re-created instance gets a new serial
    pub fn serial(&self, key: &CapabilityKey) -> Option<u64> {
        self.items.get(key).map(|item| item.serial)
    }

    /// Keys with a live reference
    pub fn live_keys(&self) -> Vec<CapabilityKey> {
        self.items
            .iter()
            .filter(|(_, item)| item.ref_count > 0)
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub(crate) fn live_instance(&self, key: &CapabilityKey) -> Option<Instance> {
        self.items
            .get(key)
            .filter(|item| item.ref_count > 0)
            .map(|item| Arc::clone(&item.instance))
    }

    pub(crate) fn stateful_items(&self) -> Vec<Arc<dyn Stateful>> {
        self.items
            .values()
            .filter(|item| item.ref_count > 0)
            .filter_map(|item| item.stateful.clone())
            .collect()
    }

    /// Insert a freshly constructed instance with a count of zero
    pub(crate) fn insert(
        &mut self,
        key: CapabilityKey,
        component: ErasedComponent,
        held: Vec<CapabilityKey>,
    ) -> u64 {
        self.next_serial += 1;
        let serial = self.next_serial;
        self.items.insert(
            key,
            CachedItem {
                instance: component.instance,
                lifecycle: component.lifecycle,
                stateful: component.stateful,
                ref_count: 0,
                held,
                serial,
            },
        );
        serial
    }

    pub(crate) fn retain(&mut self, key: &CapabilityKey) -> Result<usize> {
        let item = self
            .items
            .get_mut(key)
            .ok_or_else(|| Error::internal(format!("retain on uncached key {key}")))?;
        item.ref_count += 1;
        Ok(item.ref_count)
    }

    /// Decrement; the item is removed and returned when the count reaches zero
    pub(crate) fn release(&mut self, key: &CapabilityKey) -> Result<Option<CachedItem>> {
        let item = match self.items.get_mut(key) {
            Some(item) if item.ref_count > 0 => item,
            _ => return Err(Error::double_release(key.to_string())),
        };
        item.ref_count -= 1;
        if item.ref_count > 0 {
            return Ok(None);
        }
        Ok(self.items.remove(key))
    }

    /// Remove every item, handing ownership to the caller
    pub(crate) fn drain(&mut self) -> Vec<(CapabilityKey, CachedItem)> {
        self.items.drain().collect()
    }
}

impl fmt::Debug for ScopeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, item) in &self.items {
            map.entry(&key.to_string(), &item.ref_count);
        }
        map.finish()
    }
}

impl fmt::Debug for CachedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedItem")
            .field("ref_count", &self.ref_count)
            .field("held", &self.held)
            .field("serial", &self.serial)
            .finish_non_exhaustive()
    }
}
