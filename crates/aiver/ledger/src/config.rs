//! Configuration for an adapter ledger instance

use serde::{Deserialize, Serialize};

use crate::types::DigestAlgorithm;

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Hash used for node digests; fixed for the life of the ledger
    #[serde(default)]
    pub digest_algorithm: DigestAlgorithm,

    /// Run integrity and acyclicity checks when importing a snapshot
    #[serde(default = "default_true")]
    pub audit_on_load: bool,

    /// Nodes visited between cancellation checks during validation
    #[serde(default = "default_cancel_check_interval")]
    pub cancel_check_interval: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            digest_algorithm: DigestAlgorithm::default(),
            audit_on_load: true,
            cancel_check_interval: default_cancel_check_interval(),
        }
    }
}

impl LedgerConfig {
    /// Configuration for ledgers that must match digests produced by
    /// SHA-256 based tooling.
    pub fn sha256() -> Self {
        Self {
            digest_algorithm: DigestAlgorithm::Sha256,
            ..Default::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cancel_check_interval() -> usize {
    1024
}
