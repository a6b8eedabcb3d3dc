//! Navigator and retain/release handoff tests

use crate::test_utils::{
    Clock, DetailScreen, Fixture, ListScreen, Session, drain, key_of, recording_bus,
};
use keel_domain::{DomainEvent, Error};
use keel_infrastructure::infrastructure::InMemoryStateKeeper;
use keel_infrastructure::navigation::NavigationManager;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn manager(fixture: &Fixture) -> (NavigationManager, Arc<std::sync::Mutex<Vec<DomainEvent>>>) {
    let (bus, events) = recording_bus();
    (NavigationManager::new(Arc::clone(&fixture.graph), bus), events)
}

#[test]
fn test_first_forward_posts_event() {
    let fixture = Fixture::new();
    let (manager, events) = manager(&fixture);

    assert!(manager.navigate().forward("X").unwrap());

    let location = manager.current_location().unwrap();
    assert_eq!(location.id(), "X");
    assert!(location.previous().is_none());
    let posted = drain(&events);
    assert_eq!(posted.len(), 1);
    let forward = posted[0].as_forward().unwrap();
    assert!(forward.last.is_none());
    assert_eq!(forward.new.id(), "X");
}

#[test]
fn test_shared_capability_survives_transition() {
    let fixture = Fixture::new();
    let (manager, _events) = manager(&fixture);
    let session = key_of::<dyn Session>();

    let mut list = ListScreen::default();
    let list_injection = fixture.graph.inject(&mut list).unwrap();
    manager.navigate().forward("list").unwrap();
    manager.view_ready().unwrap();
    let before = fixture.graph.instance_id(&session);

    manager.navigate().forward("detail").unwrap();
    // Outgoing view lets go before the incoming view takes hold
    fixture.graph.release(list_injection).unwrap();
    assert_eq!(fixture.session.disposed(), 0);
    assert_eq!(fixture.repository.disposed(), 0);
    let mut detail = DetailScreen::default();
    let _detail_injection = fixture.graph.inject(&mut detail).unwrap();

    assert_eq!(fixture.graph.instance_id(&session), before);
    assert_eq!(fixture.session.disposed(), 0);
    assert_eq!(fixture.session.created(), 1);

    manager.view_ready().unwrap();

    // Only what the new view does not use goes away after settling
    assert_eq!(fixture.session.disposed(), 0);
    assert_eq!(fixture.repository.disposed(), 1);
    assert_eq!(fixture.clock.disposed(), 1);
    assert_eq!(fixture.graph.ref_count(&session), 1);
    assert_eq!(fixture.graph.instance_id(&session), before);
}

#[test]
fn test_without_handoff_shared_capability_is_rebuilt() {
    let fixture = Fixture::new();
    let session = key_of::<dyn Session>();
    let mut list = ListScreen::default();
    let list_injection = fixture.graph.inject(&mut list).unwrap();
    let before = fixture.graph.instance_id(&session);

    fixture.graph.release(list_injection).unwrap();
    let mut detail = DetailScreen::default();
    let _detail_injection = fixture.graph.inject(&mut detail).unwrap();

    assert_eq!(fixture.session.disposed(), 1);
    assert_ne!(fixture.graph.instance_id(&session), before);
}

#[test]
fn test_pins_live_until_settled() {
    let fixture = Fixture::new();
    let (manager, _events) = manager(&fixture);
    let prepared = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&prepared);

    manager
        .navigate()
        .pin_with::<dyn Clock, _>(None, move |clock| {
            counter.store(clock.now() as usize, Ordering::SeqCst);
        })
        .unwrap()
        .forward("home")
        .unwrap();

    assert_eq!(prepared.load(Ordering::SeqCst), 42);
    // Pin plus generation
    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 2);

    manager.view_ready().unwrap();

    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 0);
    assert_eq!(fixture.clock.disposed(), 1);
}

#[test]
fn test_pin_by_key_lives_until_settled() {
    let fixture = Fixture::new();
    let (manager, _events) = manager(&fixture);
    let session = key_of::<dyn Session>();

    let navigator = manager.navigate().pin_key(session.clone()).unwrap();
    assert_eq!(navigator.pinned(), std::slice::from_ref(&session));
    assert!(navigator.forward("home").unwrap());
    assert_eq!(fixture.graph.ref_count(&session), 2);

    manager.view_ready().unwrap();

    assert_eq!(fixture.graph.ref_count(&session), 0);
    assert_eq!(fixture.session.created(), 1);
    assert_eq!(fixture.session.disposed(), 1);
}

#[test]
fn test_pin_by_unbound_key_fails() {
    trait Unresolvable: Send + Sync {}
    let fixture = Fixture::new();
    let (manager, _events) = manager(&fixture);

    let result = manager
        .navigate()
        .pin::<dyn Clock>(None)
        .and_then(|navigator| navigator.pin_key(key_of::<dyn Unresolvable>()));

    assert!(result.unwrap_err().is_missing_binding());
    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 0);
    assert!(manager.current_location().is_none());
}

#[test]
fn test_on_settled_runs_after_view_ready() {
    let fixture = Fixture::new();
    let (manager, _events) = manager(&fixture);
    let settled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&settled);

    manager
        .navigate()
        .on_settled(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .forward("home")
        .unwrap();
    assert!(manager.is_settling());
    assert_eq!(settled.load(Ordering::SeqCst), 0);

    assert!(manager.view_ready().unwrap());

    assert_eq!(settled.load(Ordering::SeqCst), 1);
    assert!(!manager.is_settling());
    assert!(!manager.view_ready().unwrap());
}

#[test]
fn test_noop_navigation_settles_immediately() {
    let fixture = Fixture::new();
    let (manager, events) = manager(&fixture);
    manager.navigate().forward("home").unwrap();
    manager.view_ready().unwrap();
    drain(&events);
    let settled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&settled);

    let moved = manager
        .navigate()
        .pin::<dyn Clock>(None)
        .unwrap()
        .on_settled(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .forward("home")
        .unwrap();

    assert!(!moved);
    assert!(drain(&events).is_empty());
    assert!(!manager.is_settling());
    assert_eq!(settled.load(Ordering::SeqCst), 1);
    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 0);
}

#[test]
fn test_second_navigation_while_pending_is_rejected() {
    let fixture = Fixture::new();
    let (manager, events) = manager(&fixture);
    manager.navigate().forward("A").unwrap();

    let error = manager
        .navigate()
        .pin::<dyn Clock>(None)
        .unwrap()
        .forward("B")
        .unwrap_err();

    assert!(matches!(error, Error::NavigationPending));
    assert_eq!(manager.current_location().unwrap().id(), "A");
    assert_eq!(drain(&events).len(), 1);
    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 0);
}

#[test]
fn test_failed_pin_aborts_before_history_changes() {
    trait Unbound: Send + Sync {}
    let fixture = Fixture::new();
    let (manager, events) = manager(&fixture);
    manager.navigate().forward("A").unwrap();
    manager.view_ready().unwrap();
    drain(&events);

    let result = manager
        .navigate()
        .pin::<dyn Clock>(None)
        .and_then(|navigator| navigator.pin::<dyn Unbound>(None));

    assert!(result.unwrap_err().is_missing_binding());
    assert_eq!(manager.current_location().unwrap().id(), "A");
    assert!(drain(&events).is_empty());
    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 0);
}

#[test]
fn test_destroy_releases_pins() {
    let fixture = Fixture::new();
    let (manager, _events) = manager(&fixture);

    let navigator = manager.navigate().pin::<dyn Clock>(None).unwrap();
    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 1);
    navigator.destroy().unwrap();

    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 0);
    assert_eq!(fixture.clock.disposed(), 1);
}

#[test]
fn test_dropped_navigator_releases_pins() {
    let fixture = Fixture::new();
    let (manager, _events) = manager(&fixture);

    {
        let navigator = manager.navigate().pin::<dyn Clock>(None).unwrap();
        assert_eq!(navigator.pinned().len(), 1);
    }

    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 0);
}

#[test]
fn test_torn_down_view_releases_without_callbacks() {
    let fixture = Fixture::new();
    let (manager, _events) = manager(&fixture);
    let settled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&settled);
    let mut detail = DetailScreen::default();
    let _detail_injection = fixture.graph.inject(&mut detail).unwrap();

    manager
        .navigate()
        .pin::<dyn Clock>(None)
        .unwrap()
        .on_settled(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .forward("A")
        .unwrap();
    assert!(manager.view_torn_down().unwrap());

    assert_eq!(settled.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Clock>()), 0);
    assert_eq!(fixture.graph.ref_count(&key_of::<dyn Session>()), 1);
    assert!(!manager.is_settling());
}

#[test]
fn test_back_to_nothing_requests_exit() {
    let fixture = Fixture::new();
    let (manager, events) = manager(&fixture);
    manager.navigate().forward("A").unwrap();
    manager.view_ready().unwrap();
    drain(&events);

    assert!(manager.navigate().back().unwrap());
    manager.view_ready().unwrap();

    let posted = drain(&events);
    assert_eq!(posted.len(), 2);
    let back = posted[0].as_back().unwrap();
    assert_eq!(back.last.id(), "A");
    assert!(back.new.is_none());
    assert!(matches!(&posted[1], DomainEvent::ExitRequested { last } if last.id() == "A"));

    assert!(!manager.navigate().back().unwrap());
    assert!(drain(&events).is_empty());
}

#[test]
fn test_fast_rewind_posts_single_event() {
    let fixture = Fixture::new();
    let (manager, events) = manager(&fixture);
    for id in ["A", "B", "C", "D"] {
        manager.navigate().forward(id).unwrap();
        manager.view_ready().unwrap();
    }
    drain(&events);

    assert!(manager.navigate().back_to(Some("B")).unwrap());

    let posted = drain(&events);
    assert_eq!(posted.len(), 1);
    let back = posted[0].as_back().unwrap();
    assert!(back.fast_rewind);
    assert_eq!(back.last.id(), "D");
    assert_eq!(manager.current_location().unwrap().id(), "B");
}

#[test]
fn test_clearing_forward_reports_target() {
    let fixture = Fixture::new();
    let (manager, events) = manager(&fixture);
    for id in ["A", "B", "C", "D"] {
        manager.navigate().forward(id).unwrap();
        manager.view_ready().unwrap();
    }
    drain(&events);

    manager
        .navigate()
        .forward_clearing("E", Some("B"))
        .unwrap();

    let posted = drain(&events);
    let forward = posted[0].as_forward().unwrap();
    assert!(forward.cleared);
    assert_eq!(forward.cleared_up_to.as_ref().unwrap().id(), "B");
    let chain: Vec<String> = manager
        .state()
        .chain()
        .iter()
        .map(|location| location.id().to_string())
        .collect();
    assert_eq!(chain, vec!["A", "B", "E"]);
}

#[test]
fn test_listener_may_settle_during_dispatch() {
    let fixture = Fixture::new();
    let (bus, _events) = recording_bus();
    let manager = Arc::new(NavigationManager::new(Arc::clone(&fixture.graph), bus.clone()));
    let weak = Arc::downgrade(&manager);
    let listener: Arc<dyn keel_domain::ports::EventListener> =
        Arc::new(move |_event: &DomainEvent| {
            if let Some(manager) = weak.upgrade() {
                manager.view_ready().unwrap();
            }
        });
    keel_domain::ports::EventBus::register(bus.as_ref(), listener);

    manager.navigate().forward("A").unwrap();

    assert!(!manager.is_settling());
}

#[test]
fn test_navigation_state_round_trips_through_keeper() {
    let fixture = Fixture::new();
    let keeper = InMemoryStateKeeper::new();
    let (manager, _events) = manager(&fixture);
    for id in ["A", "B", "C"] {
        manager.navigate().forward(id).unwrap();
        manager.view_ready().unwrap();
    }
    manager.save_state(&keeper).unwrap();

    let (restored, events) = self::manager(&fixture);
    assert!(restored.restore_state(&keeper).unwrap());

    assert_eq!(restored.current_location().unwrap().id(), "C");
    assert!(drain(&events).is_empty());
    restored.navigate().back().unwrap();
    assert_eq!(restored.current_location().unwrap().id(), "B");
}

#[test]
fn test_restore_without_saved_state() {
    let fixture = Fixture::new();
    let (manager, _events) = manager(&fixture);

    assert!(!manager.restore_state(&InMemoryStateKeeper::new()).unwrap());
    assert!(manager.current_location().is_none());
}
