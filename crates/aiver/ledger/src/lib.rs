#![deny(unsafe_code)]
//! # aiver-ledger
//!
//! Append-only, content-addressed ledger of AI adapter versions. Each node
//! records one adapter's metadata and the adapters it was derived from; the
//! nodes and their parent links form a DAG.
//!
//! ## Addressing
//!
//! ```text
//! digest = H("aiver-ledger/node/v1" ‖ metadata fields ‖ created_at ‖ parent digests)
//! ```
//!
//! Fields are length-prefixed, so no two distinct nodes share an encoding.
//! `H` is BLAKE3 by default and SHA-256 when configured.
//!
//! ## Key Types
//!
//! - [`LedgerStore`]: the ledger, safe to share across threads
//! - [`LedgerNode`]: an immutable, content-addressed record
//! - [`AdapterMetadata`]: validated adapter description
//! - [`Digest`]: 32-byte node address
//! - [`AcyclicityValidator`]: iterative three-color cycle check
//! - [`LedgerSnapshot`]: bulk export and import

pub mod config;
pub mod encoding;
pub mod error;
pub mod metadata;
pub mod node;
pub mod snapshot;
pub mod store;
pub mod topology;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export primary types.
pub use config::LedgerConfig;
pub use encoding::{CanonicalEncoder, ENCODING_TAG};
pub use error::{LedgerError, MetadataField};
pub use metadata::{
    AdapterMetadata, AdapterVersion, IdentityName, Lifetime, LifetimeUnit, PolicyFileRef,
    RegulationTag,
};
pub use node::LedgerNode;
pub use snapshot::LedgerSnapshot;
pub use store::LedgerStore;
pub use topology::Adjacency;
pub use traits::{LedgerReader, LedgerWriter};
pub use types::{Digest, DigestAlgorithm, DigestParseError};
pub use validation::{AcyclicityReport, AcyclicityValidator, CancelCheck, IntegrityReport};
