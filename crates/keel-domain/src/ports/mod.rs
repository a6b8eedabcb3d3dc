//! Ports consumed by the core
//!
//! | Port | Purpose |
//! |------|---------|
//! | [`EventBus`] | Announce navigation events to listeners |
//! | [`StateKeeper`] | Save and retrieve state across process recreation |

pub mod event_bus;
pub mod state_keeper;

pub use event_bus::{EventBus, EventListener, ListenerId, SharedEventBus};
pub use state_keeper::{StateKeeper, StateKeeperExt};
