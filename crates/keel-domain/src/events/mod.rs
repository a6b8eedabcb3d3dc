//! Domain events

pub mod navigation_events;

pub use navigation_events::{DomainEvent, LocationBack, LocationForward};
