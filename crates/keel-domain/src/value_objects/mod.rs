//! Value objects
//!
//! Immutable types that identify capabilities and navigation locations.

pub mod capability;
pub mod location;

pub use capability::CapabilityKey;
pub use location::{HistorySnapshot, Location, LocationHandle};
