use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::encoding::CanonicalEncoder;
use crate::error::LedgerError;
use crate::metadata::AdapterMetadata;
use crate::types::{Digest, DigestAlgorithm};

/// A node in the adapter ledger.
///
/// The digest is computed once, at construction, over the canonical encoding
/// of `(metadata, parent_digests, created_at)`. Fields are read-only; a
/// changed record is a new node with a new digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerNode {
    digest: Digest,
    metadata: AdapterMetadata,
    parent_digests: Vec<Digest>,
    created_at: DateTime<Utc>,
}

impl LedgerNode {
    pub fn compute_digest(
        algorithm: DigestAlgorithm,
        metadata: &AdapterMetadata,
        parent_digests: &[Digest],
        created_at: &DateTime<Utc>,
    ) -> Digest {
        CanonicalEncoder::digest(algorithm, metadata, parent_digests, created_at)
    }

    pub fn new(
        algorithm: DigestAlgorithm,
        metadata: AdapterMetadata,
        parent_digests: Vec<Digest>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let digest = Self::compute_digest(algorithm, &metadata, &parent_digests, &created_at);
        Self {
            digest,
            metadata,
            parent_digests,
            created_at,
        }
    }

    /// Construct with the current wall-clock time.
    pub fn now(
        algorithm: DigestAlgorithm,
        metadata: AdapterMetadata,
        parent_digests: Vec<Digest>,
    ) -> Self {
        Self::new(algorithm, metadata, parent_digests, Utc::now())
    }

    /// Check that the stored digest matches the node's content.
    pub fn verify_digest(&self, algorithm: DigestAlgorithm) -> Result<(), LedgerError> {
        let computed = Self::compute_digest(
            algorithm,
            &self.metadata,
            &self.parent_digests,
            &self.created_at,
        );
        if computed != self.digest {
            return Err(LedgerError::DigestMismatch {
                expected: self.digest,
                computed,
            });
        }
        Ok(())
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    pub fn parent_digests(&self) -> &[Digest] {
        &self.parent_digests
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_root(&self) -> bool {
        self.parent_digests.is_empty()
    }
}
