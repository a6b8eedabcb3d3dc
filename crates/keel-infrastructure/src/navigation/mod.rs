//! Navigation
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`history`] | Location arena and the transition state machine |
//! | [`state`] | Shared read handle on the current location |
//! | [`navigator`] | One-shot transition builder with pins |
//! | [`manager`] | Commit, event posting and the retain/release handoff |

pub mod history;
pub mod manager;
pub mod navigator;
pub mod state;

pub use history::{Ancestors, NavigationHistory};
pub use manager::{NavigationManager, SettledCallback};
pub use navigator::Navigator;
pub use state::NavigationState;
