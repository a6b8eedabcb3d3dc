//! Component descriptors and instance hooks
//!
//! A factory returns a [`Component`]: the instance handed out for the
//! capability plus the optional hooks the graph drives during the
//! instance's cached lifetime.

use keel_domain::error::{Error, Result};
use keel_domain::CapabilityKey;
use std::any::Any;
use std::sync::Arc;

/// Type-erased cached instance
///
/// The erased value is always an `Arc<C>` for the capability type `C`, so
/// trait-object capabilities survive the round trip through `Any`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Construction and disposal hooks
pub trait Lifecycle: Send + Sync {
    /// Called once after the instance and all of its dependencies are wired
    fn on_created(&self) {}

    /// Called once when the reference count drops to zero and the instance is evicted
    fn on_disposed(&self) {}
}

/// State that survives process recreation through a
/// [`StateKeeper`](keel_domain::ports::StateKeeper)
pub trait Stateful: Send + Sync {
    /// Key the state is saved under
    fn state_key(&self) -> String;

    /// Capture the current state
    fn save_state(&self) -> Result<serde_json::Value>;

    /// Apply previously captured state
    fn restore_state(&self, state: serde_json::Value) -> Result<()>;
}

/// Instance produced by a factory, with its optional hooks
pub struct Component<C: ?Sized> {
    instance: Arc<C>,
    lifecycle: Option<Arc<dyn Lifecycle>>,
    stateful: Option<Arc<dyn Stateful>>,
}

impl<C: ?Sized + Send + Sync + 'static> Component<C> {
    /// Plain component without hooks
    pub fn new(instance: Arc<C>) -> Self {
        Self {
            instance,
            lifecycle: None,
            stateful: None,
        }
    }

    /// Attach construction/disposal hooks
    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn Lifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Attach state keeping
    #[must_use]
    pub fn with_state(mut self, stateful: Arc<dyn Stateful>) -> Self {
        self.stateful = Some(stateful);
        self
    }

    /// The instance handed out for the capability
    pub fn instance(&self) -> &Arc<C> {
        &self.instance
    }

    pub(crate) fn erase(self) -> ErasedComponent {
        ErasedComponent {
            instance: Arc::new(self.instance),
            lifecycle: self.lifecycle,
            stateful: self.stateful,
        }
    }
}

impl<C: ?Sized + Send + Sync + 'static> From<Arc<C>> for Component<C> {
    fn from(instance: Arc<C>) -> Self {
        Self::new(instance)
    }
}

pub(crate) struct ErasedComponent {
    pub(crate) instance: Instance,
    pub(crate) lifecycle: Option<Arc<dyn Lifecycle>>,
    pub(crate) stateful: Option<Arc<dyn Stateful>>,
}

/// Recover the typed `Arc<C>` from an erased instance
pub(crate) fn downcast<C: ?Sized + Send + Sync + 'static>(
    key: &CapabilityKey,
    instance: &Instance,
) -> Result<Arc<C>> {
    instance
        .downcast_ref::<Arc<C>>()
        .cloned()
        .ok_or_else(|| Error::type_mismatch(key.to_string(), std::any::type_name::<C>()))
}
