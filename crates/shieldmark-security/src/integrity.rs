// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content hashing — SHA-256 fingerprints for proof matching.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return the raw digest bytes.
///
/// Proof payloads carry and compare this raw form; matching is exact-hash
/// equality only — identical bytes required.
pub fn content_hash(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash of `data` as a lowercase hex string.
///
/// Used where the digest is displayed or logged rather than signed.
pub fn content_hash_hex(data: &[u8]) -> String {
    hex::encode(content_hash(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn hash_empty_input() {
        assert_eq!(content_hash_hex(b""), EMPTY_SHA256);
    }

    #[test]
    fn hash_known_value() {
        // SHA-256("hello") — verified against coreutils sha256sum.
        let expected = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert_eq!(content_hash_hex(b"hello"), expected);
    }

    #[test]
    fn raw_digest_is_32_bytes() {
        assert_eq!(content_hash(b"shieldmark").len(), 32);
    }

    #[test]
    fn different_bytes_different_hashes() {
        assert_ne!(content_hash(b"a"), content_hash(b"b"));
    }
}
