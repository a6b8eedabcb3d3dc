//! Configuration
//!
//! Typed configuration and the figment-based loader.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::{AppConfig, GraphConfig, LoggingConfig, NavigationConfig};
