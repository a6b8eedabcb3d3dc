//! Navigation Manager
//!
//! Owns the navigation state and runs the retain/release handoff around
//! every committed transition.
//!
//! ## Handoff
//!
//! ```text
//! commit ──► history moves
//!        ──► retain every live cached item        (generation pin)
//!        ──► post events                          old view releases, new view injects
//! view_ready ──► release generation and pins      truly unused items are disposed here
//!            ──► settled callbacks
//! ```
//!
//! Nothing the outgoing view shares with the incoming one can reach a zero
//! count between the two. Only one handoff may be outstanding at a time.

use super::history::NavigationHistory;
use super::navigator::Navigator;
use super::state::NavigationState;
use crate::config::NavigationConfig;
use crate::di::Graph;
use keel_domain::constants::NAVIGATION_STATE_KEY;
use keel_domain::error::{Error, Result};
use keel_domain::ports::{SharedEventBus, StateKeeper, StateKeeperExt};
use keel_domain::{CapabilityKey, DomainEvent, HistorySnapshot, Location};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Callback run once a transition settles
pub type SettledCallback = Box<dyn FnOnce() + Send>;

pub(crate) enum Transition {
    Forward { id: String },
    ForwardClearing { id: String, clear_up_to: Option<String> },
    Back,
    BackTo { to: Option<String> },
}

impl Transition {
    fn apply(&self, history: &mut NavigationHistory) -> Vec<DomainEvent> {
        match self {
            Self::Forward { id } => history.forward(id).map(DomainEvent::from).into_iter().collect(),
            Self::ForwardClearing { id, clear_up_to } => {
                vec![history.forward_clearing(id, clear_up_to.as_deref()).into()]
            }
            Self::Back => match history.back() {
                Some(back) => {
                    let exit = back.new.is_none().then(|| DomainEvent::ExitRequested {
                        last: back.last.clone(),
                    });
                    std::iter::once(DomainEvent::from(back)).chain(exit).collect()
                }
                None => Vec::new(),
            },
            Self::BackTo { to } => history
                .back_to(to.as_deref())
                .map(DomainEvent::from)
                .into_iter()
                .collect(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward { id } => write!(f, "forward({id})"),
            Self::ForwardClearing { id, clear_up_to } => {
                write!(f, "forward({id}, clear_up_to={clear_up_to:?})")
            }
            Self::Back => f.write_str("back()"),
            Self::BackTo { to } => write!(f, "back_to({to:?})"),
        }
    }
}

/// Outstanding handoff, released when the destination view is ready
struct Settlement {
    generation: Vec<CapabilityKey>,
    pins: Vec<CapabilityKey>,
    callbacks: Vec<SettledCallback>,
}

/// Drives navigation transitions over a graph and an event bus
pub struct NavigationManager {
    graph: Arc<Graph>,
    bus: SharedEventBus,
    state: NavigationState,
    pending: Mutex<Option<Settlement>>,
    log_history: bool,
}

impl NavigationManager {
    /// Manager with default navigation configuration
    pub fn new(graph: Arc<Graph>, bus: SharedEventBus) -> Self {
        Self::with_config(graph, bus, &NavigationConfig::default())
    }

    /// Manager over a graph and an event bus
    pub fn with_config(graph: Arc<Graph>, bus: SharedEventBus, config: &NavigationConfig) -> Self {
        Self {
            graph,
            bus,
            state: NavigationState::new(NavigationHistory::new(config.history_gc_threshold)),
            pending: Mutex::new(None),
            log_history: config.log_history,
        }
    }

    /// The graph pins are taken from
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Shared read handle on the navigation state
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Current location
    pub fn current_location(&self) -> Option<Location> {
        self.state.current_location()
    }

    /// Start building a transition
    pub fn navigate(&self) -> Navigator<'_> {
        Navigator::new(self)
    }

    /// Whether a committed transition has not settled yet
    pub fn is_settling(&self) -> bool {
        self.lock_pending().is_some()
    }

    /// The destination view is ready: settle the outstanding handoff
    ///
    /// Returns `false` when nothing was pending.
    pub fn view_ready(&self) -> Result<bool> {
        let Some(settlement) = self.lock_pending().take() else {
            debug!("View ready without an outstanding handoff");
            return Ok(false);
        };
        let released = self.release(&settlement);
        for callback in settlement.callbacks {
            callback();
        }
        debug!("Handoff settled");
        released.map(|()| true)
    }

    /// The destination view went away before becoming ready
    ///
    /// Releases the outstanding handoff without running settled callbacks.
    pub fn view_torn_down(&self) -> Result<bool> {
        let Some(settlement) = self.lock_pending().take() else {
            return Ok(false);
        };
        info!(
            pinned = settlement.generation.len() + settlement.pins.len(),
            "Handoff abandoned"
        );
        self.release(&settlement).map(|()| true)
    }

    /// Save the history chain
    pub fn save_state(&self, keeper: &dyn StateKeeper) -> Result<()> {
        let snapshot = self.state.snapshot();
        keeper.save_typed(NAVIGATION_STATE_KEY, &snapshot)?;
        debug!(depth = snapshot.ids.len(), "Saved navigation state");
        Ok(())
    }

    /// Restore a saved history chain without posting events
    ///
    /// Returns `false` when nothing was saved.
    pub fn restore_state(&self, keeper: &dyn StateKeeper) -> Result<bool> {
        if self.is_settling() {
            return Err(Error::NavigationPending);
        }
        let Some(snapshot) = keeper.retrieve_typed::<HistorySnapshot>(NAVIGATION_STATE_KEY)?
        else {
            return Ok(false);
        };
        self.state.lock().restore(&snapshot);
        info!(current = ?snapshot.current(), "Restored navigation state");
        Ok(true)
    }

    pub(crate) fn commit(
        &self,
        transition: Transition,
        pins: Vec<CapabilityKey>,
        callbacks: Vec<SettledCallback>,
    ) -> Result<bool> {
        let mut pending = self.lock_pending();
        if pending.is_some() {
            drop(pending);
            warn!(%transition, "Navigation committed while a handoff is outstanding");
            if let Err(error) = self.graph.release_keys(&pins) {
                error!(%error, "Releasing rejected navigator pins failed");
            }
            return Err(Error::NavigationPending);
        }

        let events = transition.apply(&mut self.state.lock());
        if events.is_empty() {
            drop(pending);
            debug!(%transition, "Navigation was a no-op");
            self.graph.release_keys(&pins)?;
            for callback in callbacks {
                callback();
            }
            return Ok(false);
        }

        let generation = self.graph.retain_live();
        *pending = Some(Settlement {
            generation,
            pins,
            callbacks,
        });
        drop(pending);

        info!(
            %transition,
            current = ?self.state.current_location().map(|location| location.id().to_string()),
            "Navigation committed"
        );
        if self.log_history {
            debug!(history = ?self.state.snapshot().ids, "Navigation history");
        }
        for event in events {
            self.bus.post(event);
        }
        Ok(true)
    }

    fn release(&self, settlement: &Settlement) -> Result<()> {
        let generation = self.graph.release_keys(&settlement.generation);
        let pins = self.graph.release_keys(&settlement.pins);
        generation.and(pins)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<Settlement>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for NavigationManager {
    fn drop(&mut self) {
        if let Err(error) = self.view_torn_down() {
            error!(%error, "Releasing outstanding handoff on drop failed");
        }
    }
}

impl fmt::Debug for NavigationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationManager")
            .field("state", &self.state)
            .field("settling", &self.is_settling())
            .finish_non_exhaustive()
    }
}
