//! Tests for the ZoomLedger and its checkpoint in the session store.

use floatshell::managers::session_manager::{SessionStore, SqliteSessionStore};
use floatshell::services::zoom_ledger::{
    domain_of, zoom_percentage, ZoomLedger, ZoomLedgerTrait, MAX_OFFSET, MIN_OFFSET, ZOOM_STEP,
};
use rstest::rstest;

#[rstest]
#[case(1, 1.1)]
#[case(5, 1.5)]
#[case(20, MAX_OFFSET)]
#[case(50, MAX_OFFSET)]
fn test_zoom_in_steps(#[case] steps: usize, #[case] expected: f64) {
    let mut ledger = ZoomLedger::default();
    for _ in 0..steps {
        ledger.step_offset("example.com", ZOOM_STEP);
    }
    assert_eq!(ledger.get_offset("example.com"), expected);
}

#[rstest]
#[case(1, 0.9)]
#[case(7, MIN_OFFSET)]
#[case(30, MIN_OFFSET)]
fn test_zoom_out_steps(#[case] steps: usize, #[case] expected: f64) {
    let mut ledger = ZoomLedger::default();
    for _ in 0..steps {
        ledger.step_offset("example.com", -ZOOM_STEP);
    }
    assert_eq!(ledger.get_offset("example.com"), expected);
}

#[test]
fn test_three_in_then_reset_returns_to_default() {
    let mut ledger = ZoomLedger::new(1.25);
    for _ in 0..3 {
        ledger.step_offset("example.com", ZOOM_STEP);
    }

    assert!(ledger.clear_offset("example.com"));

    assert_eq!(ledger.effective_zoom("example.com"), 1.25);
    assert!(!ledger.has_entry("example.com"));
    assert!(!ledger.clear_offset("example.com"));
}

#[test]
fn test_in_then_out_returns_to_unit_offset() {
    let mut ledger = ZoomLedger::default();
    for _ in 0..4 {
        ledger.step_offset("example.com", ZOOM_STEP);
    }
    for _ in 0..4 {
        ledger.step_offset("example.com", -ZOOM_STEP);
    }
    assert_eq!(ledger.get_offset("example.com"), 1.0);
    assert_eq!(zoom_percentage(ledger.effective_zoom("example.com")), 100);
}

#[test]
fn test_default_factor_change_keeps_offsets() {
    let mut ledger = ZoomLedger::default();
    ledger.set_offset("example.com", 1.5);

    ledger.set_default_factor(2.0);

    assert_eq!(ledger.get_offset("example.com"), 1.5);
    assert_eq!(ledger.effective_zoom("example.com"), 3.0);
}

#[test]
fn test_domains_are_independent() {
    let mut ledger = ZoomLedger::default();
    ledger.step_offset("a.example", ZOOM_STEP);
    assert_eq!(ledger.get_offset("b.example"), 1.0);
    assert_eq!(ledger.entries(), vec![("a.example".to_string(), 1.1)]);
}

#[test]
fn test_restore_reclamps_and_skips_blank_domains() {
    let mut ledger = ZoomLedger::default();
    ledger.restore(vec![
        ("big.example".to_string(), 9.0),
        ("".to_string(), 2.0),
        ("ok.example".to_string(), 1.2),
    ]);

    assert_eq!(
        ledger.entries(),
        vec![("big.example".to_string(), MAX_OFFSET), ("ok.example".to_string(), 1.2)]
    );
}

#[rstest]
#[case("https://www.Example.com:8443/a", Some("www.example.com"))]
#[case("http://localhost:3000", Some("localhost"))]
#[case("data:text/html,hi", None)]
#[case("about:blank", None)]
fn test_domain_keys(#[case] url: &str, #[case] expected: Option<&str>) {
    assert_eq!(domain_of(url).as_deref(), expected);
}

#[test]
fn test_checkpoint_round_trip_through_store() {
    let store = SqliteSessionStore::open_in_memory().unwrap();
    let mut ledger = ZoomLedger::default();
    ledger.step_offset("b.example", ZOOM_STEP);
    ledger.step_offset("a.example", -ZOOM_STEP);

    store.save_zoom_offsets(&ledger.entries()).unwrap();

    let mut restored = ZoomLedger::default();
    restored.restore(store.load_zoom_offsets().unwrap());
    assert_eq!(restored.entries(), ledger.entries());
}

#[test]
fn test_checkpoint_replaces_previous() {
    let store = SqliteSessionStore::open_in_memory().unwrap();
    store
        .save_zoom_offsets(&[("a.example".to_string(), 1.5), ("b.example".to_string(), 0.8)])
        .unwrap();
    store.save_zoom_offsets(&[("c.example".to_string(), 2.0)]).unwrap();

    assert_eq!(store.load_zoom_offsets().unwrap(), vec![("c.example".to_string(), 2.0)]);
}
