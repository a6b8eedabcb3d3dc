//! Injection targets
//!
//! Objects the graph does not own (screens, views, controllers held by the
//! platform layer) declare their dependency edges through [`Injectable`]
//! and receive the resolved instances in [`Injectable::bind`].

use super::component::{downcast, Instance};
use keel_domain::error::{Error, Result};
use keel_domain::CapabilityKey;
use std::sync::Arc;

/// An object whose dependencies are wired by the graph
///
/// `inject` retains one reference per declared key and returns an
/// [`Injection`] recording them; releasing that injection gives them back.
///
/// ```
/// use keel_domain::{CapabilityKey, Result};
/// use keel_infrastructure::di::{Dependencies, Injectable};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {}
///
/// #[derive(Default)]
/// struct StatusBar {
///     clock: Option<Arc<dyn Clock>>,
/// }
///
/// impl Injectable for StatusBar {
///     fn dependencies(&self) -> Vec<CapabilityKey> {
///         vec![CapabilityKey::of::<dyn Clock>()]
///     }
///
///     fn bind(&mut self, dependencies: &mut Dependencies) -> Result<()> {
///         self.clock = Some(dependencies.take::<dyn Clock>()?);
///         Ok(())
///     }
/// }
/// ```
pub trait Injectable {
    /// Declared dependency edges
    fn dependencies(&self) -> Vec<CapabilityKey>;

    /// Receive the resolved instances
    fn bind(&mut self, dependencies: &mut Dependencies) -> Result<()>;
}

/// Instances resolved for one `inject` call, in declaration order
pub struct Dependencies {
    entries: Vec<(CapabilityKey, Option<Instance>)>,
}

impl Dependencies {
    pub(crate) fn new(resolved: Vec<(CapabilityKey, Instance)>) -> Self {
        Self {
            entries: resolved
                .into_iter()
                .map(|(key, instance)| (key, Some(instance)))
                .collect(),
        }
    }

    /// Take the next unqualified `C`
    pub fn take<C: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<C>> {
        self.take_key(&CapabilityKey::of::<C>())
    }

    /// Take the next `C` with the given qualifier
    pub fn take_qualified<C: ?Sized + Send + Sync + 'static>(
        &mut self,
        qualifier: &str,
    ) -> Result<Arc<C>> {
        self.take_key(&CapabilityKey::qualified::<C, _>(qualifier))
    }

    /// Take the next instance resolved for `key`
    ///
    /// A key declared twice yields two takes, in declaration order.
    pub fn take_key<C: ?Sized + Send + Sync + 'static>(
        &mut self,
        key: &CapabilityKey,
    ) -> Result<Arc<C>> {
        let instance = self
            .entries
            .iter_mut()
            .find(|(entry, instance)| entry == key && instance.is_some())
            .and_then(|(_, instance)| instance.take())
            .ok_or_else(|| Error::internal(format!("{key} was not declared as a dependency")))?;
        downcast::<C>(key, &instance)
    }

    /// Number of instances not yet taken
    pub fn remaining(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, instance)| instance.is_some())
            .count()
    }
}

/// References retained on a target's behalf by one successful `inject`
#[must_use = "an injection holds references that must be released through the graph"]
#[derive(Debug)]
pub struct Injection {
    keys: Vec<CapabilityKey>,
}

impl Injection {
    pub(crate) fn new(keys: Vec<CapabilityKey>) -> Self {
        Self { keys }
    }

    /// Retained keys, in declaration order
    pub fn keys(&self) -> &[CapabilityKey] {
        &self.keys
    }

    pub(crate) fn into_keys(self) -> Vec<CapabilityKey> {
        self.keys
    }
}
