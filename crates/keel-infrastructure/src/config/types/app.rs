//! Main application configuration

use serde::{Deserialize, Serialize};

pub use super::graph::GraphConfig;
pub use super::logging::LoggingConfig;
pub use super::navigation::NavigationConfig;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Injection graph configuration
    pub graph: GraphConfig,
    /// Navigation configuration
    pub navigation: NavigationConfig,
}
