//! Navigation History
//!
//! Location records live in an arena keyed by [`LocationHandle`]. Each record
//! points back to the location it came from; there are no forward links.
//!
//! ```text
//!  A ◄── B ◄── C ◄── D      current = D
//!
//!  forward_clearing("E", Some("B"))
//!
//!  A ◄── B ◄── E            C, D unreachable, collected in bulk later
//! ```
//!
//! Transition methods return the event describing what happened, or `None`
//! when the call is a silent no-op. Posting the event is the caller's job.

use crate::constants::DEFAULT_HISTORY_GC_THRESHOLD;
use keel_domain::{HistorySnapshot, Location, LocationBack, LocationForward, LocationHandle};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// Singly-linked history of visited locations
pub struct NavigationHistory {
    records: HashMap<LocationHandle, Location>,
    current: Option<LocationHandle>,
    next_handle: u64,
    gc_threshold: usize,
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_GC_THRESHOLD)
    }
}

impl NavigationHistory {
    /// Empty history collecting garbage once more than `gc_threshold` records exist
    pub fn new(gc_threshold: usize) -> Self {
        Self {
            records: HashMap::new(),
            current: None,
            next_handle: 0,
            gc_threshold,
        }
    }

    /// Current location, `None` before the first forward or after exiting
    pub fn current(&self) -> Option<&Location> {
        self.current.and_then(|handle| self.records.get(&handle))
    }

    /// Resolve a handle, `None` once the record has been collected
    pub fn get(&self, handle: LocationHandle) -> Option<&Location> {
        self.records.get(&handle)
    }

    /// Locations from the current one back to the root
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            history: self,
            next: self.current,
        }
    }

    /// Reachable chain, root first
    pub fn chain(&self) -> Vec<&Location> {
        let mut chain: Vec<&Location> = self.ancestors().collect();
        chain.reverse();
        chain
    }

    /// Number of reachable locations
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Number of records held by the arena, reachable or not
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Plain forward navigation
    ///
    /// Navigating to the id that is already current is a no-op.
    pub fn forward(&mut self, id: &str) -> Option<LocationForward> {
        let last = self.current().cloned();
        if last.as_ref().is_some_and(|current| current.id() == id) {
            debug!(id, "Forward to current location ignored");
            return None;
        }
        let new = self.push(id, self.current);
        Some(LocationForward {
            last,
            new,
            cleared: false,
            cleared_up_to: None,
        })
    }

    /// Forward navigation that clears history
    ///
    /// With `clear_up_to == None` the new location becomes a root. Otherwise
    /// everything after the nearest ancestor with that id is discarded. When
    /// no ancestor matches, the new location is pushed onto the existing
    /// chain; the event still reports `cleared` with no `cleared_up_to`.
    pub fn forward_clearing(&mut self, id: &str, clear_up_to: Option<&str>) -> LocationForward {
        let last = self.current().cloned();
        let (previous, cleared_up_to) = match clear_up_to {
            None => (None, None),
            Some(target) => match self.find(target) {
                Some(found) => (Some(found.handle()), Some(found.clone())),
                None => {
                    warn!(id, clear_up_to = target, "Clear target not in history, chain kept");
                    (self.current, None)
                }
            },
        };
        let new = self.push(id, previous);
        LocationForward {
            last,
            new,
            cleared: true,
            cleared_up_to,
        }
    }

    /// One step back
    ///
    /// The event is produced even when the new current location is `None`,
    /// which the caller treats as an exit request.
    pub fn back(&mut self) -> Option<LocationBack> {
        let Some(last) = self.current().cloned() else {
            warn!("Back with no current location ignored");
            return None;
        };
        self.current = last.previous().filter(|handle| self.records.contains_key(handle));
        Some(LocationBack {
            last,
            new: self.current().cloned(),
            fast_rewind: false,
        })
    }

    /// Fast rewind to the nearest ancestor with id `to`, or to the root with `None`
    ///
    /// No-op when there is no current location, when the current location is
    /// already a root, or when no ancestor matches.
    pub fn back_to(&mut self, to: Option<&str>) -> Option<LocationBack> {
        let last = self.current().cloned()?;
        if last.is_root() {
            debug!(id = last.id(), "Fast rewind from a root location ignored");
            return None;
        }
        let found = match to {
            None => self.ancestors().last().cloned(),
            Some(target) => self.find(target).cloned(),
        };
        let Some(found) = found else {
            debug!(to, "Fast rewind target not in history");
            return None;
        };
        self.current = Some(found.handle());
        Some(LocationBack {
            last,
            new: Some(found),
            fast_rewind: true,
        })
    }

    /// Capture the reachable chain
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            ids: self
                .chain()
                .into_iter()
                .map(|location| location.id().to_string())
                .collect(),
        }
    }

    /// Replace the whole history with a captured chain
    pub fn restore(&mut self, snapshot: &HistorySnapshot) {
        self.records.clear();
        self.current = None;
        for id in &snapshot.ids {
            self.push(id, self.current);
        }
        debug!(depth = snapshot.ids.len(), "History restored");
    }

    /// Drop every record not reachable from the current location
    ///
    /// Returns the number of removed records.
    pub fn collect_garbage(&mut self) -> usize {
        let reachable: HashSet<LocationHandle> =
            self.ancestors().map(Location::handle).collect();
        let before = self.records.len();
        self.records.retain(|handle, _| reachable.contains(handle));
        let removed = before - self.records.len();
        if removed > 0 {
            debug!(removed, kept = self.records.len(), "Collected unreachable locations");
        }
        removed
    }

    /// Nearest location with `id`, walking from current toward the root
    fn find(&self, id: &str) -> Option<&Location> {
        self.ancestors().find(|location| location.id() == id)
    }

    fn push(&mut self, id: &str, previous: Option<LocationHandle>) -> Location {
        let handle = LocationHandle::new(self.next_handle);
        self.next_handle += 1;
        let location = Location::new(handle, id, previous);
        self.records.insert(handle, location.clone());
        self.current = Some(handle);
        if self.records.len() > self.gc_threshold {
            self.collect_garbage();
        }
        location
    }
}

impl fmt::Debug for NavigationHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationHistory")
            .field("chain", &self.snapshot().ids)
            .field("records", &self.records.len())
            .finish()
    }
}

/// Iterator from the current location toward the root
pub struct Ancestors<'a> {
    history: &'a NavigationHistory,
    next: Option<LocationHandle>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Location;

    fn next(&mut self) -> Option<Self::Item> {
        let location = self.history.records.get(&self.next?)?;
        self.next = location.previous();
        Some(location)
    }
}
