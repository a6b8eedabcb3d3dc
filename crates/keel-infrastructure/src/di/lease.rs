//! Counted leases

use keel_domain::CapabilityKey;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A retained instance with an outstanding release obligation
///
/// Hand it back with [`Graph::return_lease`](super::Graph::return_lease);
/// dropping it without returning keeps the reference alive.
#[must_use = "a lease holds a reference that must be returned to the graph"]
pub struct Lease<C: ?Sized> {
    key: CapabilityKey,
    instance: Arc<C>,
}

impl<C: ?Sized> Lease<C> {
    pub(crate) fn new(key: CapabilityKey, instance: Arc<C>) -> Self {
        Self { key, instance }
    }

    /// Leased capability
    pub fn key(&self) -> &CapabilityKey {
        &self.key
    }

    /// Borrow the instance
    pub fn get(&self) -> &C {
        &self.instance
    }

    /// Shared handle to the instance, for identity checks or hand-off
    pub fn instance(&self) -> &Arc<C> {
        &self.instance
    }

    pub(crate) fn into_key(self) -> CapabilityKey {
        self.key
    }
}

impl<C: ?Sized> Deref for Lease<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.instance
    }
}

impl<C: ?Sized> fmt::Debug for Lease<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease").field("key", &self.key).finish()
    }
}
