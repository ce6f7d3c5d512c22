//! Adversarial test: adjacency rewritten behind the ledger's back.
//!
//! Inserts can never create a cycle, so the only way to get one is a forged
//! snapshot. Validation must find it without trusting the adjacency.

use aiver_ledger::{
    AcyclicityReport, Digest, LedgerConfig, LedgerError, LedgerReader, LedgerSnapshot,
    LedgerStore,
};
use aiver_ledger_tests::{lineage_store, position};
use std::sync::atomic::AtomicBool;

fn unaudited() -> LedgerConfig {
    LedgerConfig {
        audit_on_load: false,
        ..LedgerConfig::default()
    }
}

#[test]
fn back_edge_fails_validation() {
    let (store, l) = lineage_store().unwrap();
    let mut snap = store.snapshot().unwrap();
    snap.children.entry(l.e).or_default().push(l.a);

    let forged = LedgerStore::from_snapshot(unaudited(), snap).unwrap();
    let report = forged.validate().unwrap();
    assert!(!report.is_acyclic());
    match report {
        AcyclicityReport::Cycle { digest, path } => {
            assert_eq!(digest, l.a);
            assert_eq!(path, vec![l.a, l.c, l.e, l.a]);
        }
        other => panic!("expected a cycle, got {:?}", other),
    }
    assert_eq!(
        forged.topological_order(),
        Err(LedgerError::CycleDetected(l.a))
    );
}

#[test]
fn back_edge_is_rejected_by_audited_import() {
    let (store, l) = lineage_store().unwrap();
    let mut snap = store.snapshot().unwrap();
    snap.children.entry(l.d).or_default().push(l.b);
    assert!(matches!(
        LedgerStore::from_snapshot(LedgerConfig::default(), snap),
        Err(LedgerError::SnapshotRejected(_))
    ));
}

#[test]
fn self_loop_is_a_cycle() {
    let (store, l) = lineage_store().unwrap();
    let mut snap = store.snapshot().unwrap();
    snap.children.entry(l.c).or_default().push(l.c);
    let forged = LedgerStore::from_snapshot(unaudited(), snap).unwrap();
    assert_eq!(forged.validate().unwrap().cycle_digest(), Some(l.c));
}

#[test]
fn cycle_through_phantom_digest_is_found() {
    let (store, l) = lineage_store().unwrap();
    let phantom = Digest::from_bytes([0x99; 32]);
    let mut snap = store.snapshot().unwrap();
    snap.children.entry(l.e).or_default().push(phantom);
    snap.children.insert(phantom, vec![l.b]);

    let forged = LedgerStore::from_snapshot(unaudited(), snap).unwrap();
    assert!(!forged.validate().unwrap().is_acyclic());
    assert!(!forged.verify_integrity().unwrap().valid);
}

#[test]
fn dropped_edge_is_an_integrity_failure_not_a_cycle() {
    let (store, l) = lineage_store().unwrap();
    let mut snap = store.snapshot().unwrap();
    snap.children.remove(&l.a);

    let forged = LedgerStore::from_snapshot(unaudited(), snap).unwrap();
    assert!(forged.validate().unwrap().is_acyclic());
    let report = forged.verify_integrity().unwrap();
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("missing adjacency edge")));
}

#[test]
fn stripped_adjacency_still_orders_parents_first() {
    let (store, l) = lineage_store().unwrap();
    let mut snap = store.snapshot().unwrap();
    // Children listed before their parents and no adjacency at all.
    snap.nodes.reverse();
    snap.children.clear();

    let forged = LedgerStore::from_snapshot(unaudited(), snap).unwrap();
    let order = forged.topological_order().unwrap();
    assert_eq!(order.len(), 5);
    let pos = |d: &Digest| position(&order, d).unwrap();
    for (parent, child) in [(l.a, l.c), (l.b, l.d), (l.c, l.e), (l.d, l.e)] {
        assert!(pos(&parent) < pos(&child), "{} placed after {}", parent, child);
    }
    assert!(!forged.verify_integrity().unwrap().valid);
}

#[test]
fn dangling_parent_is_an_integrity_failure() {
    let (store, l) = lineage_store().unwrap();
    let snap = store.snapshot().unwrap();
    // Drop A: C still names it as parent.
    let nodes = snap.nodes.into_iter().filter(|n| n.digest() != l.a).collect();
    let forged_snap = LedgerSnapshot::from_nodes(snap.algorithm, nodes);

    let forged = LedgerStore::from_snapshot(unaudited(), forged_snap.clone()).unwrap();
    let report = forged.verify_integrity().unwrap();
    assert!(report.errors.iter().any(|e| e.contains("dangling parent")));
    assert!(matches!(
        LedgerStore::from_snapshot(LedgerConfig::default(), forged_snap),
        Err(LedgerError::SnapshotRejected(_))
    ));
}

#[test]
fn cancellation_stops_validation_of_forged_graph() {
    let (store, l) = lineage_store().unwrap();
    let mut snap = store.snapshot().unwrap();
    snap.children.entry(l.e).or_default().push(l.a);
    let forged = LedgerStore::from_snapshot(unaudited(), snap).unwrap();

    let cancel = AtomicBool::new(true);
    assert_eq!(
        forged.validate_cancellable(&cancel),
        Err(LedgerError::Cancelled)
    );
}
