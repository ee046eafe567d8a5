//! Protocol transcript accumulation.

use sha2::{Digest, Sha256};

use crate::constants::SHA256_HASH_LENGTH;

/// Append-only transcript fed into a running SHA-256 context.
///
/// Every field is framed with its length as an unsigned little-endian
/// 64-bit integer followed by the raw bytes, so that an empty field
/// still contributes its frame to the digest.
#[derive(Clone, Default)]
pub struct Transcript {
    hash: Sha256,
}

impl Transcript {
    /// Start an empty transcript.
    pub fn new() -> Self {
        Self {
            hash: Sha256::new(),
        }
    }

    /// Append one length-prefixed field.
    pub fn append(&mut self, field: &[u8]) {
        self.hash.update((field.len() as u64).to_le_bytes());
        self.hash.update(field);
    }

    /// Produce the transcript hash `TT`, resetting the context.
    pub fn finish(&mut self) -> [u8; SHA256_HASH_LENGTH] {
        self.hash.finalize_reset().into()
    }
}
