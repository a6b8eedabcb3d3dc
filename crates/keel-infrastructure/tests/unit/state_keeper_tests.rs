//! State Keeper Tests

use keel_domain::ports::{StateKeeper, StateKeeperExt};
use keel_domain::HistorySnapshot;
use keel_infrastructure::infrastructure::InMemoryStateKeeper;

#[test]
fn test_missing_key_is_none() {
    let keeper = InMemoryStateKeeper::new();

    assert!(keeper.retrieve_state("absent").unwrap().is_none());
    assert!(keeper.is_empty());
}

#[test]
fn test_typed_round_trip() {
    let keeper = InMemoryStateKeeper::new();
    let snapshot = HistorySnapshot {
        ids: vec!["A".to_string(), "B".to_string()],
    };

    keeper.save_typed("history", &snapshot).unwrap();

    let restored: HistorySnapshot = keeper.retrieve_typed("history").unwrap().unwrap();
    assert_eq!(restored, snapshot);
    assert_eq!(keeper.len(), 1);
}

#[test]
fn test_wrong_shape_is_json_error() {
    let keeper = InMemoryStateKeeper::new();
    keeper.save_state("history", serde_json::json!(12)).unwrap();

    let error = keeper.retrieve_typed::<HistorySnapshot>("history").unwrap_err();

    assert!(matches!(error, keel_domain::Error::Json { .. }));
}

#[test]
fn test_remove_forgets_entry() {
    let keeper = InMemoryStateKeeper::new();
    keeper.save_state("k", serde_json::json!("v")).unwrap();

    assert!(keeper.remove("k"));
    assert!(!keeper.remove("k"));
    assert!(keeper.retrieve_state("k").unwrap().is_none());
}
