//! Binding Registry
//!
//! Maps capability keys to factories. Two tiers are consulted in order:
//!
//! ```text
//! explicit binding sets (last registered wins)
//!                 │ miss
//!                 ▼
//! conventions (populated once at startup through the builder)
//!                 │ miss
//!                 ▼
//!          Error::MissingBinding
//! ```
//!
//! ## Usage
//!
//! ```
//! use keel_infrastructure::di::{BindingRegistry, BindingSet};
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct FixedClock;
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Counter;
//!
//! let registry = BindingRegistry::builder()
//!     .convention_default::<Counter>()
//!     .build();
//!
//! let mut set = BindingSet::new("clocks");
//! set.bind_arc::<dyn Clock, _>(None, |_| Ok(Arc::new(FixedClock) as Arc<dyn Clock>));
//! assert_eq!(set.len(), 1);
//! assert_eq!(registry.convention_count(), 1);
//! ```

use super::component::{Component, ErasedComponent};
use super::injector::Injector;
use keel_domain::error::Result;
use keel_domain::CapabilityKey;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub(crate) type Factory =
    Arc<dyn Fn(&mut Injector<'_>) -> Result<ErasedComponent> + Send + Sync>;

/// Where a binding came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingOrigin {
    /// Explicitly registered through the named binding set
    Explicit(String),
    /// Convention registered at startup
    Convention,
}

/// Capability key bound to a factory
#[derive(Clone)]
pub struct Binding {
    key: CapabilityKey,
    factory: Factory,
    origin: BindingOrigin,
}

impl Binding {
    /// Bound capability
    pub fn key(&self) -> &CapabilityKey {
        &self.key
    }

    /// Where the binding came from
    pub fn origin(&self) -> &BindingOrigin {
        &self.origin
    }

    pub(crate) fn factory(&self) -> Factory {
        Arc::clone(&self.factory)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

fn erase_factory<C, F>(factory: F) -> Factory
where
    C: ?Sized + Send + Sync + 'static,
    F: Fn(&mut Injector<'_>) -> Result<Component<C>> + Send + Sync + 'static,
{
    Arc::new(move |injector: &mut Injector<'_>| factory(injector).map(Component::erase))
}

/// Named group of explicit bindings, registered and unregistered as a unit
pub struct BindingSet {
    name: String,
    bindings: Vec<Binding>,
}

impl BindingSet {
    /// Create an empty binding set
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    /// Set name, used to unregister it
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `C` (optionally qualified) to a factory producing a [`Component`]
    pub fn bind<C, F>(&mut self, qualifier: Option<&str>, factory: F) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Injector<'_>) -> Result<Component<C>> + Send + Sync + 'static,
    {
        let key = CapabilityKey::of::<C>().with_qualifier(qualifier.map(str::to_string));
        // Later bindings for the same key inside one set replace earlier ones
        self.bindings.retain(|binding| binding.key != key);
        self.bindings.push(Binding {
            key,
            factory: erase_factory(factory),
            origin: BindingOrigin::Explicit(self.name.clone()),
        });
        self
    }

    /// Bind `C` to a factory producing a bare `Arc<C>` without hooks
    pub fn bind_arc<C, F>(&mut self, qualifier: Option<&str>, factory: F) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Injector<'_>) -> Result<Arc<C>> + Send + Sync + 'static,
    {
        self.bind::<C, _>(qualifier, move |injector| factory(injector).map(Component::new))
    }

    /// Keys bound by this set
    pub fn keys(&self) -> impl Iterator<Item = &CapabilityKey> {
        self.bindings.iter().map(Binding::key)
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for BindingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingSet")
            .field("name", &self.name)
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

/// Registry of explicit binding sets and startup conventions
#[derive(Default)]
pub struct BindingRegistry {
    explicit: Vec<BindingSet>,
    conventions: HashMap<TypeId, Binding>,
}

impl BindingRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for the convention tier
    pub fn builder() -> BindingRegistryBuilder {
        BindingRegistryBuilder::default()
    }

    /// Install a binding set; a set with the same name is replaced
    ///
    /// Returns the keys whose resolution may have changed.
    pub fn register(&mut self, set: BindingSet) -> Vec<CapabilityKey> {
        let mut affected: Vec<CapabilityKey> = set.keys().cloned().collect();
        if let Some(old) = self.remove_set(set.name()) {
            affected.extend(old.keys().cloned());
        }
        debug!(set = %set.name(), bindings = set.len(), "Registered binding set");
        self.explicit.push(set);
        affected
    }

    /// Remove a binding set by name
    ///
    /// Returns the keys it bound, or `None` if no such set was registered.
    pub fn unregister(&mut self, name: &str) -> Option<Vec<CapabilityKey>> {
        let removed = self.remove_set(name)?;
        debug!(set = %name, "Unregistered binding set");
        Some(removed.keys().cloned().collect())
    }

    /// Find the binding for a key: explicit sets first, newest first, then conventions
    ///
    /// Conventions only serve unqualified keys.
    pub fn lookup(&self, key: &CapabilityKey) -> Option<Binding> {
        self.explicit
            .iter()
            .rev()
            .flat_map(|set| set.bindings.iter())
            .find(|binding| &binding.key == key)
            .or_else(|| {
                if key.qualifier().is_some() {
                    return None;
                }
                self.conventions.get(&key.type_id())
            })
            .cloned()
    }

    /// Whether a key can be produced
    pub fn can_resolve(&self, key: &CapabilityKey) -> bool {
        self.lookup(key).is_some()
    }

    /// Names of the registered sets, oldest first
    pub fn set_names(&self) -> Vec<&str> {
        self.explicit.iter().map(BindingSet::name).collect()
    }

    /// Number of conventions
    pub fn convention_count(&self) -> usize {
        self.conventions.len()
    }

    fn remove_set(&mut self, name: &str) -> Option<BindingSet> {
        let index = self.explicit.iter().position(|set| set.name() == name)?;
        Some(self.explicit.remove(index))
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("sets", &self.set_names())
            .field("conventions", &self.conventions.len())
            .finish()
    }
}

/// Builder populating the convention tier at startup
#[derive(Default)]
pub struct BindingRegistryBuilder {
    conventions: HashMap<TypeId, Binding>,
}

impl BindingRegistryBuilder {
    /// Conventional implementation for `C`
    #[must_use]
    pub fn convention<C, F>(mut self, factory: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Injector<'_>) -> Result<Component<C>> + Send + Sync + 'static,
    {
        let key = CapabilityKey::of::<C>();
        self.conventions.insert(
            key.type_id(),
            Binding {
                key,
                factory: erase_factory(factory),
                origin: BindingOrigin::Convention,
            },
        );
        self
    }

    /// Concrete type constructing itself through `Default`
    #[must_use]
    pub fn convention_default<T>(self) -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        self.convention::<T, _>(|_| Ok(Component::new(Arc::new(T::default()))))
    }

    /// Finish the registry
    pub fn build(self) -> BindingRegistry {
        BindingRegistry {
            explicit: Vec::new(),
            conventions: self.conventions,
        }
    }
}
