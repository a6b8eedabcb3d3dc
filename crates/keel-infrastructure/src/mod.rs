//! # Infrastructure Layer
//!
//! The injection graph, the navigation core and the adapters and
//! cross-cutting concerns around them.
//!
//! ## Module Categories
//!
//! ### Core
//! | Module | Description |
//! |--------|-------------|
//! | [`di`] | Reference-counted dependency injection graph |
//! | [`navigation`] | Navigation history, navigator and handoff |
//!
//! ### Adapters
//! | Module | Description |
//! |--------|-------------|
//! | [`infrastructure`] | Event bus and state keeper implementations |
//!
//! ### Configuration & Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML/env configuration through figment |
//! | [`constants`] | Centralized configuration constants |
//! | [`logging`] | Structured logging with tracing |
//! | [`error_ext`] | Context helpers for foreign errors |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod infrastructure;
pub mod logging;
pub mod navigation;

// Re-export commonly used types
pub use error_ext::ErrorContext;

// Internal tests module (can access pub(crate) items)
#[cfg(test)]
mod tests;
