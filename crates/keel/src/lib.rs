//! # Keel
//!
//! Reference-counted dependency injection and navigation history for
//! graphical client applications.
//!
//! ## Features
//!
//! - **Injection graph**: capabilities resolved by key, cached while referenced and
//!   disposed when the last holder releases them
//! - **Navigation history**: forward, back, fast rewind and clearing over an arena of
//!   locations
//! - **Handoff**: shared instances survive screen transitions without being rebuilt
//!
//! ## Example
//!
//! ```
//! use keel::{AppConfig, Application, BindingRegistry, BindingSet};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let app = Application::init(AppConfig::default(), BindingRegistry::new()).unwrap();
//! let mut set = BindingSet::new("greeters");
//! set.bind_arc::<dyn Greeter, _>(None, |_| Ok(Arc::new(English) as Arc<dyn Greeter>));
//! app.graph().register(set);
//!
//! app.navigation().navigate().forward("home").unwrap();
//! let greeting = app
//!     .graph()
//!     .use_capability::<dyn Greeter, _, _>(None, |greeter| greeter.greet())
//!     .unwrap();
//! assert_eq!(greeting, "hello");
//! app.navigation().view_ready().unwrap();
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Capability keys, locations, events, errors and ports
//! - `infrastructure` - Graph, navigation, adapters, config and logging
//! - [`Application`] - Wires the pieces together for one process

mod application;

/// Domain layer - core types and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use keel_domain::*;
}

/// Infrastructure layer - graph, navigation, config and adapters
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use keel_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export the graph and navigation entry points
pub use infrastructure::config::{AppConfig, ConfigLoader};
pub use infrastructure::di::{
    BindingRegistry, BindingSet, Component, Dependencies, Graph, Injectable, Injection, Injector,
    Lease, Lifecycle, Stateful,
};
pub use infrastructure::navigation::{NavigationManager, NavigationState, Navigator};

pub use application::Application;
