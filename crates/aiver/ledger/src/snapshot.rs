use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::node::LedgerNode;
use crate::types::{Digest, DigestAlgorithm};

/// Bulk export of a ledger: nodes in insertion order plus forward adjacency.
///
/// A snapshot is plain data. Nothing about it is trusted on import; see
/// `LedgerStore::from_snapshot`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub algorithm: DigestAlgorithm,
    pub nodes: Vec<LedgerNode>,
    pub children: BTreeMap<Digest, Vec<Digest>>,
}

impl LedgerSnapshot {
    /// Assemble a snapshot from nodes alone, deriving adjacency from each
    /// node's parent list. Node order is kept as given.
    pub fn from_nodes(algorithm: DigestAlgorithm, nodes: Vec<LedgerNode>) -> Self {
        let mut children: BTreeMap<Digest, Vec<Digest>> = BTreeMap::new();
        for node in &nodes {
            for parent in distinct(node.parent_digests()) {
                children.entry(parent).or_default().push(node.digest());
            }
        }
        Self {
            algorithm,
            nodes,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }
}

/// Parent digests with repeats removed, first occurrence wins.
pub(crate) fn distinct(digests: &[Digest]) -> Vec<Digest> {
    let mut out: Vec<Digest> = Vec::with_capacity(digests.len());
    for d in digests {
        if !out.contains(d) {
            out.push(*d);
        }
    }
    out
}
