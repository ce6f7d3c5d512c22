//! Property tests: any sequence of accepted inserts yields a valid DAG whose
//! topological order respects every parent link.

use aiver_ledger::{AcyclicityReport, Digest, LedgerReader, LedgerStore, LedgerWriter};
use aiver_ledger_tests::{at, metadata, position};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

/// One insert: a name suffix plus parent picks. Each pick is reduced modulo
/// the number of nodes already present, so parents always exist.
fn arb_insert() -> impl Strategy<Value = (String, Vec<usize>)> {
    ("[a-z]{1,8}", prop::collection::vec(any::<usize>(), 0..4))
}

fn arb_history() -> impl Strategy<Value = Vec<(String, Vec<usize>)>> {
    prop::collection::vec(arb_insert(), 1..40)
}

fn replay(store: &LedgerStore, history: &[(String, Vec<usize>)]) -> Vec<Digest> {
    let mut inserted: Vec<Digest> = Vec::new();
    for (i, (name, picks)) in history.iter().enumerate() {
        let parents: Vec<Digest> = if inserted.is_empty() {
            vec![]
        } else {
            picks.iter().map(|p| inserted[p % inserted.len()]).collect()
        };
        let meta = metadata(
            &format!("adapter-{}", name),
            &format!("{}.0", i),
            "1 year",
            "2027-01-01",
            "policy.json",
            "Regulation A",
        )
        .unwrap();
        inserted.push(store.insert_at(meta, parents, at(i as i64)).unwrap());
    }
    inserted
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Insert-only ledgers are always acyclic and fully visited.
    #[test]
    fn insert_only_ledgers_validate(history in arb_history()) {
        let store = LedgerStore::new();
        let inserted = replay(&store, &history);
        match store.validate().unwrap() {
            AcyclicityReport::Acyclic { nodes_visited, .. } => {
                prop_assert_eq!(nodes_visited, inserted.len());
            }
            AcyclicityReport::Cycle { digest, .. } => {
                prop_assert!(false, "unexpected cycle at {}", digest);
            }
        }
        prop_assert!(store.verify_integrity().unwrap().valid);
    }

    /// Every parent precedes its child in the topological order.
    #[test]
    fn topological_order_respects_parents(history in arb_history()) {
        let store = LedgerStore::new();
        let inserted = replay(&store, &history);
        let order = store.topological_order().unwrap();
        prop_assert_eq!(order.len(), inserted.len());

        for digest in &inserted {
            let child_pos = position(&order, digest).unwrap();
            for parent in store.get(digest).unwrap().parent_digests() {
                prop_assert!(position(&order, parent).unwrap() < child_pos);
            }
        }
    }

    /// Roots are exactly the nodes inserted without parents.
    #[test]
    fn roots_are_parentless_nodes(history in arb_history()) {
        let store = LedgerStore::new();
        let inserted = replay(&store, &history);
        let expected: Vec<Digest> = inserted
            .iter()
            .filter(|d| store.get(d).unwrap().is_root())
            .copied()
            .collect();
        prop_assert_eq!(store.roots().unwrap(), expected);
    }
}
