//! CRC32 checksums for record files
//!
//! Every framed record carries a trailing CRC32 (IEEE polynomial) over its
//! length prefix and body; every read verifies it.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided bytes.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Returns whether the computed checksum matches the stored one.
pub fn verify_checksum(data: &[u8], stored: u32) -> bool {
    compute_checksum(data) == stored
}
