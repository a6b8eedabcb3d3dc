//! Resolution pass and the injector handed to factories
//!
//! One pass covers a single `inject`/`lease` call. It carries the
//! resolution stack used for cycle detection, a journal of every retain
//! made during the pass (for rollback) and the instances created so far
//! (for their construction hooks once the pass succeeds).

use super::component::{downcast, Lifecycle, Stateful};
use super::graph::Graph;
use keel_domain::error::Result;
use keel_domain::CapabilityKey;
use std::sync::Arc;

pub(crate) struct CreatedItem {
    pub(crate) key: CapabilityKey,
    pub(crate) lifecycle: Option<Arc<dyn Lifecycle>>,
    pub(crate) stateful: Option<Arc<dyn Stateful>>,
}

pub(crate) struct ResolutionPass {
    pub(crate) stack: Vec<CapabilityKey>,
    pub(crate) journal: Vec<CapabilityKey>,
    pub(crate) created: Vec<CreatedItem>,
    pub(crate) max_depth: usize,
}

impl ResolutionPass {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            stack: Vec::new(),
            journal: Vec::new(),
            created: Vec::new(),
            max_depth,
        }
    }

    /// Chain from the first occurrence of `key` to the top of the stack, closed by `key`
    pub(crate) fn cycle(&self, key: &CapabilityKey) -> Option<Vec<String>> {
        let start = self.stack.iter().position(|entry| entry == key)?;
        let mut chain: Vec<String> = self.stack[start..].iter().map(ToString::to_string).collect();
        chain.push(key.to_string());
        Some(chain)
    }
}

/// Handed to factories so they can pull their own dependencies
///
/// Every capability obtained here is retained on behalf of the instance
/// under construction and released when that instance is evicted.
pub struct Injector<'a> {
    graph: &'a Graph,
    pass: &'a mut ResolutionPass,
    held: Vec<CapabilityKey>,
}

impl<'a> Injector<'a> {
    pub(crate) fn new(graph: &'a Graph, pass: &'a mut ResolutionPass) -> Self {
        Self {
            graph,
            pass,
            held: Vec::new(),
        }
    }

    /// Resolve an unqualified dependency
    pub fn get<C: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<C>> {
        self.get_key(CapabilityKey::of::<C>())
    }

    /// Resolve a qualified dependency
    pub fn get_qualified<C: ?Sized + Send + Sync + 'static>(
        &mut self,
        qualifier: &str,
    ) -> Result<Arc<C>> {
        self.get_key(CapabilityKey::qualified::<C, _>(qualifier))
    }

    /// Resolve a dependency by key
    pub fn get_key<C: ?Sized + Send + Sync + 'static>(
        &mut self,
        key: CapabilityKey,
    ) -> Result<Arc<C>> {
        let instance = self.graph.acquire(self.pass, &key)?;
        // Held before the downcast: a mismatch still owes a release
        self.held.push(key.clone());
        downcast::<C>(&key, &instance)
    }

    /// Key of the instance being constructed
    pub fn requester(&self) -> Option<&CapabilityKey> {
        self.pass.stack.last()
    }

    pub(crate) fn into_held(self) -> Vec<CapabilityKey> {
        self.held
    }
}
