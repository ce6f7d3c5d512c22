use std::fmt;

use crate::types::{Digest, DigestAlgorithm};

/// Errors from ledger operations.
///
/// Every mutating operation that returns one of these leaves the store exactly
/// as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("malformed metadata: {field} {reason}")]
    MalformedMetadata { field: MetadataField, reason: String },

    #[error("parent not found: {0}")]
    ParentNotFound(Digest),

    #[error("duplicate digest: {0}")]
    DuplicateDigest(Digest),

    #[error("node not found: {0}")]
    NotFound(Digest),

    #[error("cycle detected at {0}")]
    CycleDetected(Digest),

    #[error("digest mismatch: expected {expected}, computed {computed}")]
    DigestMismatch { expected: Digest, computed: Digest },

    #[error("digest algorithm mismatch: ledger uses {expected}, snapshot uses {found}")]
    AlgorithmMismatch {
        expected: DigestAlgorithm,
        found: DigestAlgorithm,
    },

    #[error("snapshot rejected: {0}")]
    SnapshotRejected(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    pub(crate) fn malformed(field: MetadataField, reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            field,
            reason: reason.into(),
        }
    }
}

/// Names an adapter metadata field in `MalformedMetadata` errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetadataField {
    IdentityName,
    Version,
    ExpirationDate,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityName => write!(f, "identity_name"),
            Self::Version => write!(f, "version"),
            Self::ExpirationDate => write!(f, "expiration_date"),
        }
    }
}
