//! Unit tests for navigation events

use keel_domain::{DomainEvent, Location, LocationBack, LocationForward, LocationHandle};

fn location(raw: u64, id: &str) -> Location {
    Location::new(LocationHandle::new(raw), id, None)
}

#[test]
fn test_forward_accessors() {
    let event: DomainEvent = LocationForward {
        last: None,
        new: location(1, "home"),
        cleared: false,
        cleared_up_to: None,
    }
    .into();

    let forward = event.as_forward().expect("forward event");
    assert_eq!(forward.new.id(), "home");
    assert!(event.as_back().is_none());
}

#[test]
fn test_back_accessors() {
    let event: DomainEvent = LocationBack {
        last: location(2, "detail"),
        new: None,
        fast_rewind: false,
    }
    .into();

    let back = event.as_back().expect("back event");
    assert_eq!(back.last.id(), "detail");
    assert!(back.new.is_none());
    assert!(event.as_forward().is_none());
}
