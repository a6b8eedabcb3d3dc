//! Application context
//!
//! Owns the graph, the event bus and the navigation manager for one
//! process.

use keel_domain::error::Result;
use keel_domain::ports::{SharedEventBus, StateKeeper};
use keel_infrastructure::config::AppConfig;
use keel_infrastructure::config::loader::validate_app_config;
use keel_infrastructure::di::{BindingRegistry, Graph};
use keel_infrastructure::infrastructure::InProcessEventBus;
use keel_infrastructure::navigation::NavigationManager;
use std::sync::Arc;
use tracing::{info, warn};

/// Wired graph, event bus and navigation manager
pub struct Application {
    config: AppConfig,
    graph: Arc<Graph>,
    event_bus: SharedEventBus,
    navigation: NavigationManager,
}

impl Application {
    /// Build the application over a binding registry
    ///
    /// Logging is left to the caller, see
    /// [`init_logging`](keel_infrastructure::logging::init_logging).
    pub fn init(config: AppConfig, bindings: BindingRegistry) -> Result<Self> {
        Self::init_with_bus(config, bindings, InProcessEventBus::new_shared())
    }

    /// Build the application posting navigation events to `event_bus`
    pub fn init_with_bus(
        config: AppConfig,
        bindings: BindingRegistry,
        event_bus: SharedEventBus,
    ) -> Result<Self> {
        validate_app_config(&config)?;
        let graph = Arc::new(Graph::with_config(bindings, &config.graph));
        let navigation = NavigationManager::with_config(
            Arc::clone(&graph),
            Arc::clone(&event_bus),
            &config.navigation,
        );
        info!(
            max_resolution_depth = config.graph.max_resolution_depth,
            "Application initialized"
        );
        Ok(Self {
            config,
            graph,
            event_bus,
            navigation,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Injection graph
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Event bus navigation events are posted to
    pub fn event_bus(&self) -> &SharedEventBus {
        &self.event_bus
    }

    /// Navigation manager
    pub fn navigation(&self) -> &NavigationManager {
        &self.navigation
    }

    /// Save live stateful instances and the navigation history
    pub fn save_state(&self, keeper: &dyn StateKeeper) -> Result<()> {
        let saved = self.graph.save_state(keeper)?;
        self.navigation.save_state(keeper)?;
        info!(instances = saved, "Application state saved");
        Ok(())
    }

    /// Restore the navigation history and route saved state to instances
    /// built from now on
    ///
    /// Returns whether a navigation history was restored.
    pub fn restore_state(&self, keeper: Arc<dyn StateKeeper>) -> Result<bool> {
        let restored = self.navigation.restore_state(keeper.as_ref())?;
        self.graph.restore_state(keeper.as_ref())?;
        self.graph.set_state_source(Some(keeper));
        Ok(restored)
    }

    /// Abandon any outstanding handoff and dispose every cached instance
    ///
    /// Returns the number of disposed instances.
    pub fn teardown(&self) -> Result<usize> {
        if self.navigation.view_torn_down()? {
            warn!("Teardown abandoned an unsettled navigation");
        }
        Ok(self.graph.teardown())
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("graph", &self.graph)
            .field("navigation", &self.navigation)
            .finish_non_exhaustive()
    }
}
