//! Injection Graph
//!
//! Orchestrates resolution on top of the binding registry, the providers
//! and the scope cache.
//!
//! ## Resolution
//!
//! ```text
//! inject(target)
//!   └─ for each declared key ──► acquire(key)
//!                                 ├─ live in cache?  retain, reuse
//!                                 └─ otherwise       provider factory(injector)
//!                                                      └─ injector.get(dep) ──► acquire(dep) ...
//!                                                    insert, retain
//!   └─ target.bind(dependencies)
//!   └─ on_created hooks, in construction order
//!   └─ Injection { retained keys } ──► release(injection)
//! ```
//!
//! Every retain made during one call is journaled. When anything fails the
//! journal is unwound, so a failed `inject` leaves every count where it was.
//! Instances built during a failed call are dropped without hooks.
//!
//! ## Threading
//!
//! The graph is meant to be driven from one controller thread. The internal
//! lock is never held while factories, hooks or listeners run, so those may
//! call back into the graph.

use super::binding::{BindingRegistry, BindingSet};
use super::component::{downcast, Instance};
use super::injectable::{Dependencies, Injectable, Injection};
use super::injector::{CreatedItem, Injector, ResolutionPass};
use super::lease::Lease;
use super::provider::{Eviction, FreedListener, Provider};
use super::scope_cache::{CachedItem, ScopeCache};
use crate::config::GraphConfig;
use keel_domain::constants::GRAPH_STATE_PREFIX;
use keel_domain::error::{Error, Result};
use keel_domain::ports::StateKeeper;
use keel_domain::CapabilityKey;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, trace, warn};

struct GraphState {
    registry: BindingRegistry,
    providers: HashMap<CapabilityKey, Provider>,
    cache: ScopeCache,
    state_source: Option<Arc<dyn StateKeeper>>,
}

impl GraphState {
    /// Provider for `key`, (re)binding it from the registry when needed
    fn provider_for(&mut self, key: &CapabilityKey) -> Result<&mut Provider> {
        let needs_binding = self.providers.get(key).is_none_or(Provider::is_stale);
        if needs_binding {
            let Some(binding) = self.registry.lookup(key) else {
                self.providers.remove(key);
                return Err(Error::missing_binding(key.to_string()));
            };
            match self.providers.get_mut(key) {
                Some(provider) => provider.rebind(binding),
                None => {
                    self.providers.insert(key.clone(), Provider::new(binding));
                }
            }
        }
        self.providers
            .get_mut(key)
            .ok_or_else(|| Error::internal(format!("provider for {key} vanished")))
    }

    /// Registry entries for `keys` changed
    fn invalidate(&mut self, keys: &[CapabilityKey]) {
        for key in keys {
            let live = self.cache.ref_count(key) > 0;
            let Some(provider) = self.providers.get_mut(key) else {
                continue;
            };
            if live {
                // Holders keep the current instance; rebind once it is evicted
                provider.mark_stale();
            } else if let Some(binding) = self.registry.lookup(key) {
                provider.rebind(binding);
            } else {
                self.providers.remove(key);
            }
        }
    }
}

/// Reference-counted dependency injection graph
pub struct Graph {
    state: Mutex<GraphState>,
    max_depth: usize,
}

impl Graph {
    /// Graph over a registry with default configuration
    pub fn new(registry: BindingRegistry) -> Self {
        Self::with_config(registry, &GraphConfig::default())
    }

    /// Graph over a registry
    pub fn with_config(registry: BindingRegistry, config: &GraphConfig) -> Self {
        Self {
            state: Mutex::new(GraphState {
                registry,
                providers: HashMap::new(),
                cache: ScopeCache::new(),
                state_source: None,
            }),
            max_depth: config.max_resolution_depth,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GraphState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Bindings
    // ========================================================================

    /// Install an explicit binding set
    ///
    /// Live instances under the affected keys stay with their holders; the
    /// new binding is used for the next construction.
    pub fn register(&self, set: BindingSet) {
        let mut state = self.lock();
        let affected = state.registry.register(set);
        state.invalidate(&affected);
    }

    /// Remove an explicit binding set by name
    pub fn unregister(&self, name: &str) -> bool {
        let mut state = self.lock();
        match state.registry.unregister(name) {
            Some(affected) => {
                state.invalidate(&affected);
                true
            }
            None => false,
        }
    }

    /// Whether a key can currently be produced
    pub fn can_resolve(&self, key: &CapabilityKey) -> bool {
        let state = self.lock();
        state.cache.ref_count(key) > 0 || state.registry.can_resolve(key)
    }

    // ========================================================================
    // Targets
    // ========================================================================

    /// Resolve, retain and bind every dependency declared by `target`
    ///
    /// The returned [`Injection`] records exactly what was retained; hand it
    /// to [`Graph::release`] when the target goes away. A failed call retains
    /// nothing and yields no injection.
    pub fn inject<T: Injectable + ?Sized>(&self, target: &mut T) -> Result<Injection> {
        let keys = target.dependencies();
        trace!(dependencies = keys.len(), "Injecting target");
        self.run_pass(|graph, pass| {
            let mut resolved = Vec::with_capacity(keys.len());
            for key in &keys {
                let instance = graph.acquire(pass, key)?;
                resolved.push((key.clone(), instance));
            }
            target.bind(&mut Dependencies::new(resolved))
        })
        .inspect_err(|error| debug!(%error, "Injection failed and was rolled back"))?;
        Ok(Injection::new(keys))
    }

    /// Release the references retained by one `inject`
    pub fn release(&self, injection: Injection) -> Result<()> {
        self.release_keys(&injection.into_keys())
    }

    // ========================================================================
    // Keys and leases
    // ========================================================================

    /// Resolve and retain a key
    pub fn retain_key(&self, key: &CapabilityKey) -> Result<Instance> {
        self.run_pass(|graph, pass| graph.acquire(pass, key))
    }

    /// Release one reference on a key, evicting on zero
    pub fn release_key(&self, key: &CapabilityKey) -> Result<()> {
        let eviction = {
            let mut state = self.lock();
            let GraphState {
                providers, cache, ..
            } = &mut *state;
            match providers.get(key) {
                Some(provider) => provider.release(cache)?,
                None => cache.release(key)?.map(|item| Eviction {
                    item,
                    listeners: Vec::new(),
                }),
            }
        };
        trace!(%key, evicted = eviction.is_some(), "Released");
        match eviction {
            Some(eviction) => self.dispose(key, eviction),
            None => Ok(()),
        }
    }

    /// Release every key, reporting the first failure after trying all
    pub fn release_keys(&self, keys: &[CapabilityKey]) -> Result<()> {
        let mut first_error = None;
        for key in keys {
            if let Err(error) = self.release_key(key) {
                warn!(%key, %error, "Release failed");
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Resolve and retain `C` as a typed lease
    pub fn lease<C: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: Option<&str>,
    ) -> Result<Lease<C>> {
        self.lease_key(CapabilityKey::of::<C>().with_qualifier(qualifier.map(str::to_string)))
    }

    /// Resolve and retain a key as a typed lease
    pub fn lease_key<C: ?Sized + Send + Sync + 'static>(
        &self,
        key: CapabilityKey,
    ) -> Result<Lease<C>> {
        let instance = self.run_pass(|graph, pass| {
            let instance = graph.acquire(pass, &key)?;
            downcast::<C>(&key, &instance)
        })?;
        Ok(Lease::new(key, instance))
    }

    /// Give a lease back
    pub fn return_lease<C: ?Sized>(&self, lease: Lease<C>) -> Result<()> {
        self.release_key(&lease.into_key())
    }

    /// Resolve `C`, run `f` on it, then release it
    pub fn use_capability<C, R, F>(&self, qualifier: Option<&str>, f: F) -> Result<R>
    where
        C: ?Sized + Send + Sync + 'static,
        F: FnOnce(&C) -> R,
    {
        let lease = self.lease::<C>(qualifier)?;
        let result = f(lease.get());
        self.return_lease(lease)?;
        Ok(result)
    }

    /// Take one extra reference on every live cached item
    ///
    /// Returns the pinned keys; release them with [`Graph::release_keys`].
    pub fn retain_live(&self) -> Vec<CapabilityKey> {
        let mut state = self.lock();
        let keys = state.cache.live_keys();
        for key in &keys {
            if let Err(error) = state.cache.retain(key) {
                warn!(%key, %error, "Pin failed");
            }
        }
        debug!(pinned = keys.len(), "Pinned live generation");
        keys
    }

    /// Register a callback fired whenever the key's cached item is evicted
    pub fn add_freed_listener<F>(&self, key: &CapabilityKey, listener: F) -> Result<()>
    where
        F: Fn(&CapabilityKey) + Send + Sync + 'static,
    {
        let listener: FreedListener = Arc::new(listener);
        self.lock().provider_for(key)?.add_listener(listener);
        Ok(())
    }

    // ========================================================================
    // Introspection and administration
    // ========================================================================

    /// Live reference count of a key
    pub fn ref_count(&self, key: &CapabilityKey) -> usize {
        self.lock().cache.ref_count(key)
    }

    /// Identity of the cached instance, `None` when not cached
    pub fn instance_id(&self, key: &CapabilityKey) -> Option<u64> {
        self.lock().cache.serial(key)
    }

    /// Keys with live references
    pub fn live_keys(&self) -> Vec<CapabilityKey> {
        self.lock().cache.live_keys()
    }

    /// Swap the backing cache wholesale, returning the previous one
    pub fn hijack(&self, cache: ScopeCache) -> ScopeCache {
        warn!(items = cache.len(), "Scope cache hijacked");
        std::mem::replace(&mut self.lock().cache, cache)
    }

    /// Dispose every cached item, dependents first, and clear the cache
    ///
    /// Returns the number of disposed instances. Bindings stay registered.
    pub fn teardown(&self) -> usize {
        let (mut remaining, listeners) = {
            let mut state = self.lock();
            let listeners: HashMap<CapabilityKey, Vec<FreedListener>> = state
                .providers
                .drain()
                .map(|(key, provider)| (key, provider.listeners()))
                .collect();
            (state.cache.drain(), listeners)
        };
        let disposed = remaining.len();
        while !remaining.is_empty() {
            let index = remaining
                .iter()
                .position(|(key, _)| !remaining.iter().any(|(_, other)| other.held.contains(key)))
                .unwrap_or(0);
            let (key, item) = remaining.swap_remove(index);
            let freed = listeners.get(&key).map(Vec::as_slice).unwrap_or_default();
            notify_disposed(&key, &item, freed);
        }
        info!(disposed, "Graph torn down");
        disposed
    }

    // ========================================================================
    // State keeping
    // ========================================================================

    /// Restore newly constructed stateful instances from `keeper`
    pub fn set_state_source(&self, keeper: Option<Arc<dyn StateKeeper>>) {
        self.lock().state_source = keeper;
    }

    /// Save every live stateful instance
    pub fn save_state(&self, keeper: &dyn StateKeeper) -> Result<usize> {
        let items = self.lock().cache.stateful_items();
        for stateful in &items {
            let key = format!("{GRAPH_STATE_PREFIX}{}", stateful.state_key());
            keeper.save_state(&key, stateful.save_state()?)?;
        }
        debug!(saved = items.len(), "Saved graph state");
        Ok(items.len())
    }

    /// Restore every live stateful instance that has saved state
    pub fn restore_state(&self, keeper: &dyn StateKeeper) -> Result<usize> {
        let items = self.lock().cache.stateful_items();
        let mut restored = 0;
        for stateful in items {
            let key = format!("{GRAPH_STATE_PREFIX}{}", stateful.state_key());
            if let Some(state) = keeper.retrieve_state(&key)? {
                stateful.restore_state(state)?;
                restored += 1;
            }
        }
        debug!(restored, "Restored graph state");
        Ok(restored)
    }

    // ========================================================================
    // Resolution internals
    // ========================================================================

    fn run_pass<R>(
        &self,
        body: impl FnOnce(&Self, &mut ResolutionPass) -> Result<R>,
    ) -> Result<R> {
        let mut pass = ResolutionPass::new(self.max_depth);
        match body(self, &mut pass) {
            Ok(value) => {
                self.finish(pass);
                Ok(value)
            }
            Err(error) => {
                self.rollback(&mut pass, 0);
                Err(error)
            }
        }
    }

    /// Resolve `key` and retain it for the current requester
    pub(crate) fn acquire(
        &self,
        pass: &mut ResolutionPass,
        key: &CapabilityKey,
    ) -> Result<Instance> {
        if let Some(chain) = pass.cycle(key) {
            return Err(Error::circular_dependency(chain));
        }

        let factory = {
            let mut state = self.lock();
            if let Some(instance) = state.cache.live_instance(key) {
                state.cache.retain(key)?;
                pass.journal.push(key.clone());
                trace!(%key, "Reused cached instance");
                return Ok(instance);
            }
            state.provider_for(key)?.factory()
        };

        if pass.stack.len() >= pass.max_depth {
            return Err(Error::ResolutionDepthExceeded {
                key: key.to_string(),
                depth: pass.max_depth,
            });
        }

        let journal_mark = pass.journal.len();
        let created_mark = pass.created.len();
        pass.stack.push(key.clone());
        let mut injector = Injector::new(self, pass);
        let built = factory(&mut injector);
        let held = injector.into_held();
        pass.stack.pop();

        let component = match built {
            Ok(component) => component,
            Err(error) => {
                // Undo what this factory retained before failing
                self.rollback(pass, journal_mark);
                pass.created.truncate(created_mark);
                return Err(error);
            }
        };

        let mut state = self.lock();
        if state.cache.ref_count(key) > 0 {
            drop(state);
            self.rollback(pass, journal_mark);
            pass.created.truncate(created_mark);
            return Err(Error::internal(format!(
                "{key} was constructed by a nested pass while its factory ran"
            )));
        }
        let instance = Arc::clone(&component.instance);
        pass.created.push(CreatedItem {
            key: key.clone(),
            lifecycle: component.lifecycle.clone(),
            stateful: component.stateful.clone(),
        });
        let serial = state.cache.insert(key.clone(), component, held);
        state.cache.retain(key)?;
        pass.journal.push(key.clone());
        debug!(%key, serial, "Constructed instance");
        Ok(instance)
    }

    /// Undo journaled retains past `mark`, newest first, without running hooks
    fn rollback(&self, pass: &mut ResolutionPass, mark: usize) {
        let entries: Vec<CapabilityKey> = pass.journal.drain(mark..).collect();
        let mut state = self.lock();
        for key in entries.iter().rev() {
            if let Err(error) = state.cache.release(key) {
                warn!(%key, %error, "Rollback release failed");
            }
        }
    }

    /// Run construction hooks once a pass has committed
    fn finish(&self, pass: ResolutionPass) {
        if pass.created.is_empty() {
            return;
        }
        let source = self.lock().state_source.clone();
        for created in pass.created {
            if let (Some(stateful), Some(keeper)) = (&created.stateful, &source) {
                let state_key = format!("{GRAPH_STATE_PREFIX}{}", stateful.state_key());
                match keeper.retrieve_state(&state_key) {
                    Ok(Some(state)) => {
                        if let Err(error) = stateful.restore_state(state) {
                            warn!(key = %created.key, %error, "State restore failed");
                        }
                    }
                    Ok(None) => {}
                    Err(error) => warn!(key = %created.key, %error, "State lookup failed"),
                }
            }
            if let Some(lifecycle) = &created.lifecycle {
                lifecycle.on_created();
            }
        }
    }

    /// Run disposal for an evicted item, then release what it held
    fn dispose(&self, key: &CapabilityKey, eviction: Eviction) -> Result<()> {
        notify_disposed(key, &eviction.item, &eviction.listeners);
        self.release_keys(&eviction.item.held)
    }
}

fn notify_disposed(key: &CapabilityKey, item: &CachedItem, listeners: &[FreedListener]) {
    debug!(%key, serial = item.serial, "Disposing instance");
    if let Some(lifecycle) = &item.lifecycle {
        lifecycle.on_disposed();
    }
    for listener in listeners {
        listener(key);
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Graph")
            .field("registry", &state.registry)
            .field("providers", &state.providers.len())
            .field("cache", &state.cache)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
