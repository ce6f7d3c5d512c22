//! End-to-end test: concurrent writers and readers on one shared ledger.
//!
//! Readers must only ever observe whole inserts: every listed node resolves,
//! every parent it names resolves, and the graph stays acyclic.

use std::sync::Arc;
use std::thread;

use aiver_ledger::{LedgerReader, LedgerStore, LedgerWriter};
use aiver_ledger_tests::{at, metadata};

const WRITERS: usize = 4;
const PER_WRITER: usize = 50;

#[test]
fn readers_never_observe_partial_inserts() {
    let store = Arc::new(LedgerStore::new());

    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut prev = None;
                for i in 0..PER_WRITER {
                    let meta = metadata(
                        &format!("adapter-{}", w),
                        &format!("{}.0", i),
                        "1 year",
                        "2027-01-01",
                        "policy.json",
                        "",
                    )
                    .unwrap();
                    let parents = prev.into_iter().collect();
                    let offset = (w * PER_WRITER + i) as i64;
                    prev = Some(store.insert_at(meta, parents, at(offset)).unwrap());
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..50 {
                    let snap = store.snapshot().unwrap();
                    for node in &snap.nodes {
                        for parent in node.parent_digests() {
                            assert!(snap.nodes.iter().any(|n| n.digest() == *parent));
                            assert!(snap.children[parent].contains(&node.digest()));
                        }
                    }
                    assert!(store.validate().unwrap().is_acyclic());
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), WRITERS * PER_WRITER);
    assert_eq!(store.roots().unwrap().len(), WRITERS);
    assert!(store.verify_integrity().unwrap().valid);
    assert_eq!(store.topological_order().unwrap().len(), WRITERS * PER_WRITER);
}

#[test]
fn concurrent_duplicate_inserts_admit_exactly_one() {
    let store = Arc::new(LedgerStore::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let meta =
                    metadata("Aladapter1", "1.0", "2 years", "2026-01-01", "policy_v1.json", "")
                        .unwrap();
                store.insert_at(meta, vec![], at(0)).is_ok()
            })
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(store.len().unwrap(), 1);
}
