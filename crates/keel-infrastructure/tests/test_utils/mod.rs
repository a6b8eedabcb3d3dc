//! Shared fixtures for the infrastructure test suites

#![allow(dead_code)]

use keel_domain::ports::{EventBus, EventListener};
use keel_domain::{CapabilityKey, DomainEvent, Result};
use keel_infrastructure::di::{
    BindingRegistry, BindingSet, Component, Dependencies, Graph, Injectable, Lifecycle, Stateful,
};
use keel_infrastructure::infrastructure::InProcessEventBus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Capabilities
// ============================================================================

pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

pub trait Repository: Send + Sync {
    fn stamp(&self) -> u64;
}

pub struct ClockedRepository {
    clock: Arc<dyn Clock>,
}

impl Repository for ClockedRepository {
    fn stamp(&self) -> u64 {
        self.clock.now()
    }
}

pub trait Session: Send + Sync {
    fn user(&self) -> Option<String>;
    fn login(&self, user: &str);
}

#[derive(Default)]
pub struct MemorySession {
    user: Mutex<Option<String>>,
}

impl Session for MemorySession {
    fn user(&self) -> Option<String> {
        self.user.lock().unwrap().clone()
    }

    fn login(&self, user: &str) {
        *self.user.lock().unwrap() = Some(user.to_string());
    }
}

impl Stateful for MemorySession {
    fn state_key(&self) -> String {
        "session".to_string()
    }

    fn save_state(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.user())?)
    }

    fn restore_state(&self, state: serde_json::Value) -> Result<()> {
        *self.user.lock().unwrap() = serde_json::from_value(state)?;
        Ok(())
    }
}

// ============================================================================
// Lifecycle probes
// ============================================================================

/// Counts hook invocations and appends them to a shared log
pub struct Probe {
    name: &'static str,
    created: AtomicUsize,
    disposed: AtomicUsize,
    log: Arc<Mutex<Vec<String>>>,
}

impl Probe {
    pub fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name,
            created: AtomicUsize::new(0),
            disposed: AtomicUsize::new(0),
            log: Arc::clone(log),
        })
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Lifecycle for Probe {
    fn on_created(&self) {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("created {}", self.name));
    }

    fn on_disposed(&self) {
        self.disposed.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("disposed {}", self.name));
    }
}

/// Graph over the standard clock/repository/session bindings
pub struct Fixture {
    pub graph: Arc<Graph>,
    pub log: Arc<Mutex<Vec<String>>>,
    pub clock: Arc<Probe>,
    pub repository: Arc<Probe>,
    pub session: Arc<Probe>,
}

impl Fixture {
    pub fn new() -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let clock = Probe::new("clock", &log);
        let repository = Probe::new("repository", &log);
        let session = Probe::new("session", &log);
        let graph = Arc::new(Graph::new(BindingRegistry::new()));
        graph.register(app_bindings(&clock, &repository, &session));
        Self {
            graph,
            log,
            clock,
            repository,
            session,
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

pub fn app_bindings(clock: &Arc<Probe>, repository: &Arc<Probe>, session: &Arc<Probe>) -> BindingSet {
    let mut set = BindingSet::new("app");

    let probe = Arc::clone(clock);
    set.bind::<dyn Clock, _>(None, move |_| {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(42));
        Ok(Component::new(clock).with_lifecycle(probe.clone()))
    });

    let probe = Arc::clone(repository);
    set.bind::<dyn Repository, _>(None, move |injector| {
        let clock = injector.get::<dyn Clock>()?;
        let repository: Arc<dyn Repository> = Arc::new(ClockedRepository { clock });
        Ok(Component::new(repository).with_lifecycle(probe.clone()))
    });

    let probe = Arc::clone(session);
    set.bind::<dyn Session, _>(None, move |_| {
        let concrete = Arc::new(MemorySession::default());
        let session: Arc<dyn Session> = concrete.clone();
        Ok(Component::new(session)
            .with_lifecycle(probe.clone())
            .with_state(concrete))
    });

    set
}

pub fn key_of<C: ?Sized + 'static>() -> CapabilityKey {
    CapabilityKey::of::<C>()
}

// ============================================================================
// Injection targets
// ============================================================================

/// Screen listing records: repository and session
#[derive(Default)]
pub struct ListScreen {
    pub repository: Option<Arc<dyn Repository>>,
    pub session: Option<Arc<dyn Session>>,
}

impl Injectable for ListScreen {
    fn dependencies(&self) -> Vec<CapabilityKey> {
        vec![key_of::<dyn Repository>(), key_of::<dyn Session>()]
    }

    fn bind(&mut self, dependencies: &mut Dependencies) -> Result<()> {
        self.repository = Some(dependencies.take::<dyn Repository>()?);
        self.session = Some(dependencies.take::<dyn Session>()?);
        Ok(())
    }
}

/// Screen showing one record: session only
#[derive(Default)]
pub struct DetailScreen {
    pub session: Option<Arc<dyn Session>>,
}

impl Injectable for DetailScreen {
    fn dependencies(&self) -> Vec<CapabilityKey> {
        vec![key_of::<dyn Session>()]
    }

    fn bind(&mut self, dependencies: &mut Dependencies) -> Result<()> {
        self.session = Some(dependencies.take::<dyn Session>()?);
        Ok(())
    }
}

// ============================================================================
// Event recording
// ============================================================================

/// Event bus with a listener recording every posted event
pub fn recording_bus() -> (Arc<InProcessEventBus>, Arc<Mutex<Vec<DomainEvent>>>) {
    let bus = InProcessEventBus::new_shared();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let listener: Arc<dyn EventListener> = Arc::new(move |event: &DomainEvent| {
        sink.lock().unwrap().push(event.clone());
    });
    bus.register(listener);
    (bus, events)
}

pub fn drain(events: &Arc<Mutex<Vec<DomainEvent>>>) -> Vec<DomainEvent> {
    std::mem::take(&mut *events.lock().unwrap())
}
