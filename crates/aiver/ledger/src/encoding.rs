//! Canonical byte encoding of a node's hashed content.
//!
//! Layout (v1):
//!
//! ```text
//! "aiver-ledger/node/v1"
//! u64-be len || utf8   identity_name
//! u64-be len || utf8   version
//! u64-be len || utf8   lifetime (as supplied)
//! u64-be len || utf8   expiration_date (YYYY-MM-DD)
//! u64-be len || utf8   policy_file
//! u64-be len || utf8   regulations
//! i64-be secs || u32-be nanos   created_at
//! u64-be count || 32 bytes each parent_digests, caller order
//! ```
//!
//! Every variable-length field is length-prefixed, so two different inputs
//! never share an encoding.

use chrono::{DateTime, Utc};

use crate::metadata::AdapterMetadata;
use crate::types::{Digest, DigestAlgorithm};

pub const ENCODING_TAG: &[u8] = b"aiver-ledger/node/v1";

/// Stateless encoder for node content.
pub struct CanonicalEncoder;

impl CanonicalEncoder {
    pub fn encode(
        metadata: &AdapterMetadata,
        parent_digests: &[Digest],
        created_at: &DateTime<Utc>,
    ) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256 + parent_digests.len() * Digest::LEN);
        buf.extend_from_slice(ENCODING_TAG);

        put_text(&mut buf, metadata.identity_name().as_str());
        put_text(&mut buf, metadata.version().as_str());
        put_text(&mut buf, metadata.lifetime().as_str());
        put_text(
            &mut buf,
            &metadata.expiration_date().format("%Y-%m-%d").to_string(),
        );
        put_text(&mut buf, metadata.policy_file().as_str());
        put_text(&mut buf, metadata.regulations().as_str());

        buf.extend_from_slice(&created_at.timestamp().to_be_bytes());
        buf.extend_from_slice(&created_at.timestamp_subsec_nanos().to_be_bytes());

        buf.extend_from_slice(&(parent_digests.len() as u64).to_be_bytes());
        for parent in parent_digests {
            buf.extend_from_slice(parent.as_bytes());
        }
        buf
    }

    /// Encode and hash in one step.
    pub fn digest(
        algorithm: DigestAlgorithm,
        metadata: &AdapterMetadata,
        parent_digests: &[Digest],
        created_at: &DateTime<Utc>,
    ) -> Digest {
        algorithm.digest(&Self::encode(metadata, parent_digests, created_at))
    }
}

fn put_text(buf: &mut Vec<u8>, value: &str) {
    buf.extend_from_slice(&(value.len() as u64).to_be_bytes());
    buf.extend_from_slice(value.as_bytes());
}
