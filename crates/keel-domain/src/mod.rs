//! # Domain Layer
//!
//! Core types shared by the injection graph and the navigation core.
//! This crate holds no behavior beyond value semantics; the graph, the
//! navigation history and the adapters live in `keel-infrastructure`.
//!
//! ## Module Categories
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error taxonomy and `Result` alias |
//! | [`value_objects`] | Capability keys, locations, history snapshots |
//! | [`events`] | Navigation events posted to the event bus |
//! | [`ports`] | Event bus and state keeper contracts |
//! | [`constants`] | Domain-wide constants |

pub mod constants;
pub mod error;
pub mod events;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use events::{DomainEvent, LocationBack, LocationForward};
pub use value_objects::{CapabilityKey, HistorySnapshot, Location, LocationHandle};
