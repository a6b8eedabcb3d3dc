//! Navigation Events
//!
//! Events raised by the navigator once a transition has been decided. They
//! are delivered through the [`EventBus`](crate::ports::EventBus) port so
//! views and controllers react to navigation without knowing the navigator.

use crate::value_objects::Location;
use serde::{Deserialize, Serialize};

/// A forward navigation has been committed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationForward {
    /// Location current before the transition
    pub last: Option<Location>,
    /// Newly created current location
    pub new: Location,
    /// Whether history was cleared as part of the transition
    pub cleared: bool,
    /// Ancestor the history was cleared up to
    ///
    /// `None` with `cleared` is either a full reset or a clear target that was
    /// not found; the new location's `previous` tells them apart.
    pub cleared_up_to: Option<Location>,
}

/// A back navigation has been committed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationBack {
    /// Location current before the transition
    pub last: Location,
    /// New current location, `None` when the application should exit
    pub new: Option<Location>,
    /// Whether the transition jumped directly to an ancestor
    pub fast_rewind: bool,
}

/// System-wide events posted by the core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DomainEvent {
    /// Forward transition
    LocationForward(LocationForward),
    /// Back transition
    LocationBack(LocationBack),
    /// One-step back left no current location
    ExitRequested {
        /// The location that was left
        last: Location,
    },
}

impl DomainEvent {
    /// Forward payload, if this is a forward event
    pub fn as_forward(&self) -> Option<&LocationForward> {
        match self {
            Self::LocationForward(event) => Some(event),
            _ => None,
        }
    }

    /// Back payload, if this is a back event
    pub fn as_back(&self) -> Option<&LocationBack> {
        match self {
            Self::LocationBack(event) => Some(event),
            _ => None,
        }
    }
}

impl From<LocationForward> for DomainEvent {
    fn from(event: LocationForward) -> Self {
        Self::LocationForward(event)
    }
}

impl From<LocationBack> for DomainEvent {
    fn from(event: LocationBack) -> Self {
        Self::LocationBack(event)
    }
}
