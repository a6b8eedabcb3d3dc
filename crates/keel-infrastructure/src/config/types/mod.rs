//! Configuration types module

pub mod app;
pub mod graph;
pub mod logging;
pub mod navigation;

// Re-export main types
pub use app::*;
