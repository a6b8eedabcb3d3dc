//! Dependency Injection
//!
//! Reference-counted resolution of capabilities.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`binding`] | Binding sets, conventions and the lookup order |
//! | [`graph`] | Resolve/retain/release orchestration |
//! | [`provider`] | Per-key binding and freed listeners |
//! | [`scope_cache`] | Instances and their reference counts |
//! | [`injector`] | Handle given to factories for nested resolution |
//! | [`injectable`] | Targets wired by `Graph::inject` |
//! | [`lease`] | Typed counted references |

pub mod binding;
pub mod component;
pub mod graph;
pub mod injectable;
pub mod injector;
pub mod lease;
pub mod provider;
pub mod scope_cache;

pub use binding::{Binding, BindingOrigin, BindingRegistry, BindingRegistryBuilder, BindingSet};
pub use component::{Component, Instance, Lifecycle, Stateful};
pub use graph::Graph;
pub use injectable::{Dependencies, Injectable, Injection};
pub use injector::Injector;
pub use lease::Lease;
pub use provider::{FreedListener, Provider};
pub use scope_cache::ScopeCache;
