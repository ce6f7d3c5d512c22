use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::metadata::AdapterMetadata;
use crate::node::LedgerNode;
use crate::snapshot::{distinct, LedgerSnapshot};
use crate::topology::{self, Adjacency};
use crate::traits::{LedgerReader, LedgerWriter};
use crate::types::{Digest, DigestAlgorithm};
use crate::validation::{AcyclicityReport, AcyclicityValidator, CancelCheck, IntegrityReport};

/// Append-only, content-addressed adapter ledger.
///
/// Writers are serialized behind one lock; readers share it and always see
/// either the whole of an insert or none of it.
pub struct LedgerStore {
    config: LedgerConfig,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    order: Vec<Digest>,
    nodes: HashMap<Digest, LedgerNode>,
    children: HashMap<Digest, Vec<Digest>>,
}

impl LedgerState {
    fn adjacency(&self) -> Adjacency<'_> {
        Adjacency::new(&self.order, &self.children)
    }

    fn parents_of(&self, digest: &Digest) -> &[Digest] {
        self.nodes
            .get(digest)
            .map(LedgerNode::parent_digests)
            .unwrap_or(&[])
    }
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Rebuild a ledger from a snapshot without replaying inserts.
    ///
    /// Only the digest algorithm and digest uniqueness are enforced here.
    /// With `audit_on_load` the imported graph must also pass
    /// `verify_integrity` and `validate`; otherwise it is loaded as-is and the
    /// caller is expected to audit it.
    pub fn from_snapshot(
        config: LedgerConfig,
        snapshot: LedgerSnapshot,
    ) -> Result<Self, LedgerError> {
        if snapshot.algorithm != config.digest_algorithm {
            return Err(LedgerError::AlgorithmMismatch {
                expected: config.digest_algorithm,
                found: snapshot.algorithm,
            });
        }

        let mut state = LedgerState::default();
        for node in snapshot.nodes {
            let digest = node.digest();
            if state.nodes.contains_key(&digest) {
                return Err(LedgerError::DuplicateDigest(digest));
            }
            state.order.push(digest);
            state.nodes.insert(digest, node);
        }
        state.children = snapshot.children.into_iter().collect();

        let audit = config.audit_on_load;
        let store = Self {
            config,
            inner: RwLock::new(state),
        };

        if audit {
            let integrity = store.verify_integrity()?;
            if !integrity.valid {
                warn!(
                    errors = integrity.errors.len(),
                    "Snapshot rejected: integrity audit failed"
                );
                return Err(LedgerError::SnapshotRejected(integrity.errors.join("; ")));
            }
            if let AcyclicityReport::Cycle { digest, .. } = store.validate()? {
                return Err(LedgerError::SnapshotRejected(format!(
                    "cycle detected at {}",
                    digest
                )));
            }
        }

        info!(
            nodes = store.len()?,
            algorithm = %store.config.digest_algorithm,
            audited = audit,
            "Snapshot loaded"
        );
        Ok(store)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.config.digest_algorithm
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    /// All digests in insertion order.
    pub fn digests(&self) -> Result<Vec<Digest>, LedgerError> {
        Ok(self.read()?.order.clone())
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> Result<Vec<LedgerNode>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .order
            .iter()
            .filter_map(|d| state.nodes.get(d).cloned())
            .collect())
    }

    /// Every transitive parent of `digest`, nearest first.
    pub fn ancestors(&self, digest: &Digest) -> Result<Vec<Digest>, LedgerError> {
        let state = self.read()?;
        if !state.nodes.contains_key(digest) {
            return Err(LedgerError::NotFound(*digest));
        }
        Ok(topology::breadth_first(*digest, |d| state.parents_of(d)))
    }

    /// Every transitive child of `digest`, nearest first.
    pub fn descendants(&self, digest: &Digest) -> Result<Vec<Digest>, LedgerError> {
        let state = self.read()?;
        if !state.nodes.contains_key(digest) {
            return Err(LedgerError::NotFound(*digest));
        }
        let adjacency = state.adjacency();
        Ok(topology::breadth_first(*digest, |d| adjacency.children_of(d)))
    }

    /// Nodes recording a version of `identity_name`, in insertion order.
    pub fn versions_of(&self, identity_name: &str) -> Result<Vec<Digest>, LedgerError> {
        self.select(|node| node.metadata().identity_name().as_str() == identity_name)
    }

    /// Nodes whose adapter has expired on `date`.
    pub fn expired_as_of(&self, date: NaiveDate) -> Result<Vec<Digest>, LedgerError> {
        self.select(|node| node.metadata().is_expired(date))
    }

    fn select(&self, pred: impl Fn(&LedgerNode) -> bool) -> Result<Vec<Digest>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .order
            .iter()
            .filter(|d| state.nodes.get(*d).is_some_and(&pred))
            .copied()
            .collect())
    }

    /// Acyclicity check that gives up with `Cancelled` once `cancel` is set.
    pub fn validate_cancellable(
        &self,
        cancel: &AtomicBool,
    ) -> Result<AcyclicityReport, LedgerError> {
        let state = self.read()?;
        AcyclicityValidator::check_cancellable(
            state.adjacency(),
            CancelCheck {
                flag: cancel,
                interval: self.config.cancel_check_interval,
            },
        )
    }

    /// Structural audit: digests recompute, parents resolve, and adjacency
    /// agrees with parent lists in both directions.
    pub fn verify_integrity(&self) -> Result<IntegrityReport, LedgerError> {
        let state = self.read()?;
        let algorithm = self.config.digest_algorithm;
        let mut report = IntegrityReport::start();

        for key in &state.order {
            let Some(node) = state.nodes.get(key) else {
                report.record(false, || format!("indexed digest has no node: {}", key));
                continue;
            };
            let verified = node.verify_digest(algorithm);
            report.record(verified.is_ok(), || match verified {
                Err(e) => format!("content digest: {}", e),
                Ok(()) => String::new(),
            });

            for parent in distinct(node.parent_digests()) {
                let exists = state.nodes.contains_key(&parent);
                report.record(exists, || format!("dangling parent {} of {}", parent, key));
                let linked = state
                    .children
                    .get(&parent)
                    .is_some_and(|kids| kids.contains(key));
                report.record(linked, || {
                    format!("missing adjacency edge {} -> {}", parent, key)
                });
            }
        }

        let mut edges: Vec<(&Digest, &Vec<Digest>)> = state.children.iter().collect();
        edges.sort_by_key(|(parent, _)| **parent);
        for (parent, kids) in edges {
            for child in kids {
                let declared = state
                    .nodes
                    .get(child)
                    .is_some_and(|n| n.parent_digests().contains(parent));
                report.record(declared, || {
                    format!("adjacency edge {} -> {} has no parent reference", parent, child)
                });
            }
        }

        if !report.valid {
            warn!(
                errors = report.errors.len(),
                checks = report.checks_performed,
                "Integrity audit failed"
            );
        }
        Ok(report)
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let state = self.read()?;
        Ok(LedgerSnapshot {
            algorithm: self.config.digest_algorithm,
            nodes: state
                .order
                .iter()
                .filter_map(|d| state.nodes.get(d).cloned())
                .collect(),
            children: state
                .children
                .iter()
                .map(|(k, v)| (*k, v.clone()))
                .collect::<BTreeMap<_, _>>(),
        })
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerWriter for LedgerStore {
    fn insert_at(
        &self,
        metadata: AdapterMetadata,
        parent_digests: Vec<Digest>,
        created_at: DateTime<Utc>,
    ) -> Result<Digest, LedgerError> {
        let mut state = self.write()?;

        if let Some(missing) = parent_digests
            .iter()
            .find(|p| !state.nodes.contains_key(*p))
        {
            warn!(
                parent = %missing,
                identity = %metadata.identity_name(),
                "Insert rejected: parent not found"
            );
            return Err(LedgerError::ParentNotFound(*missing));
        }

        let node = LedgerNode::new(
            self.config.digest_algorithm,
            metadata,
            parent_digests,
            created_at,
        );
        let digest = node.digest();
        if state.nodes.contains_key(&digest) {
            warn!(digest = %digest, "Insert rejected: duplicate digest");
            return Err(LedgerError::DuplicateDigest(digest));
        }

        for parent in distinct(node.parent_digests()) {
            state.children.entry(parent).or_default().push(digest);
        }
        info!(
            digest = %digest.short(),
            identity = %node.metadata().identity_name(),
            version = %node.metadata().version(),
            parents = node.parent_digests().len(),
            "Adapter node appended"
        );
        state.order.push(digest);
        state.nodes.insert(digest, node);
        Ok(digest)
    }
}

impl LedgerReader for LedgerStore {
    fn get(&self, digest: &Digest) -> Result<LedgerNode, LedgerError> {
        self.read()?
            .nodes
            .get(digest)
            .cloned()
            .ok_or(LedgerError::NotFound(*digest))
    }

    fn contains(&self, digest: &Digest) -> Result<bool, LedgerError> {
        Ok(self.read()?.nodes.contains_key(digest))
    }

    fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.order.len())
    }

    fn roots(&self) -> Result<Vec<Digest>, LedgerError> {
        self.select(LedgerNode::is_root)
    }

    fn children(&self, digest: &Digest) -> Result<Vec<Digest>, LedgerError> {
        Ok(self
            .read()?
            .children
            .get(digest)
            .cloned()
            .unwrap_or_default())
    }

    fn topological_order(&self) -> Result<Vec<Digest>, LedgerError> {
        let state = self.read()?;
        topology::topological_order(state.adjacency(), |d| state.parents_of(d))
    }

    fn validate(&self) -> Result<AcyclicityReport, LedgerError> {
        let state = self.read()?;
        Ok(AcyclicityValidator::check(state.adjacency()))
    }
}
