use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::metadata::AdapterMetadata;
use crate::node::LedgerNode;
use crate::types::Digest;
use crate::validation::AcyclicityReport;

/// Write boundary for the adapter ledger.
///
/// An insert is atomic: on error neither the node index nor the adjacency
/// has changed.
pub trait LedgerWriter {
    /// Append a node stamped with the current wall-clock time.
    fn insert(
        &self,
        metadata: AdapterMetadata,
        parent_digests: Vec<Digest>,
    ) -> Result<Digest, LedgerError> {
        self.insert_at(metadata, parent_digests, Utc::now())
    }

    /// Append a node with an explicit creation time.
    fn insert_at(
        &self,
        metadata: AdapterMetadata,
        parent_digests: Vec<Digest>,
        created_at: DateTime<Utc>,
    ) -> Result<Digest, LedgerError>;
}

/// Read boundary for the adapter ledger.
pub trait LedgerReader {
    fn get(&self, digest: &Digest) -> Result<LedgerNode, LedgerError>;

    fn contains(&self, digest: &Digest) -> Result<bool, LedgerError>;

    fn len(&self) -> Result<usize, LedgerError>;

    fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    /// Nodes without parents, in insertion order.
    fn roots(&self) -> Result<Vec<Digest>, LedgerError>;

    /// Direct children in insertion order. An unknown digest has no children;
    /// use `contains` to tell the two apart.
    fn children(&self, digest: &Digest) -> Result<Vec<Digest>, LedgerError>;

    fn topological_order(&self) -> Result<Vec<Digest>, LedgerError>;

    fn validate(&self) -> Result<AcyclicityReport, LedgerError>;
}
