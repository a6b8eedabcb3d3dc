//! Navigation locations
//!
//! A [`Location`] is an immutable node of the navigation history. Its
//! back-reference is a [`LocationHandle`] into the history arena rather
//! than a pointer, so unreachable chains can be collected in bulk.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a location record in the history arena
///
/// Handles are never reused, so a handle held after its record was
/// collected simply no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationHandle(u64);

impl LocationHandle {
    /// Wrap a raw arena index
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw arena index
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of the navigation history
///
/// Equality compares ids only: the same id may appear several times in one
/// history and those occurrences are considered equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    handle: LocationHandle,
    id: String,
    previous: Option<LocationHandle>,
}

impl Location {
    /// Create a location record
    pub fn new<S: Into<String>>(
        handle: LocationHandle,
        id: S,
        previous: Option<LocationHandle>,
    ) -> Self {
        Self {
            handle,
            id: id.into(),
            previous,
        }
    }

    /// Arena handle of this record
    pub fn handle(&self) -> LocationHandle {
        self.handle
    }

    /// Opaque location identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Handle of the location we came from
    pub fn previous(&self) -> Option<LocationHandle> {
        self.previous
    }

    /// Whether this is the oldest location of its chain
    pub fn is_root(&self) -> bool {
        self.previous.is_none()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Location {}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Serializable form of a history chain, ordered from the root to the
/// current location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Location ids, oldest first
    pub ids: Vec<String>,
}

impl HistorySnapshot {
    /// Whether the snapshot holds no location
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id of the current location, if any
    pub fn current(&self) -> Option<&str> {
        self.ids.last().map(String::as_str)
    }
}
