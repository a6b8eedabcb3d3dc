//! Port adapters
//!
//! | Adapter | Port |
//! |---------|------|
//! | [`InProcessEventBus`] | `EventBus`, synchronous fan-out |
//! | [`NullEventBus`] | `EventBus`, discards events |
//! | [`InMemoryStateKeeper`] | `StateKeeper`, process-lifetime map |

pub mod events;
pub mod state_keeper;

pub use events::{InProcessEventBus, NullEventBus};
pub use state_keeper::InMemoryStateKeeper;
