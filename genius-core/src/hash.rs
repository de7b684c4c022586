//! Hashing primitives used by the envelope: Blake2b-256 for the
//! content-committing `data_hash`, SHA-256 for the bytes that get signed.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Hashes `bytes` with Blake2b-256 and renders the digest as lowercase hex,
/// matching `data_hash = Blake2b-256(serialize(...))` from the envelope spec.
pub fn blake2b256_hex(bytes: &[u8]) -> String {
    let mut hasher = Blake2b256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hashes `bytes` with Blake2b-256, returning the raw 32-byte digest.
pub fn blake2b256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// SHA-256 digest of `bytes`, used as the message an envelope's signature
/// is computed over.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let digest = sha256::digest(bytes);
    let mut out = [0u8; 32];
    hex::decode_to_slice(digest, &mut out).expect("sha256::digest always returns 64 hex chars");
    out
}

/// Keccak-256, used only for Ethereum-style address derivation from a
/// public key.
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    use sha3::Keccak256;
    let mut hasher = Keccak256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b256_is_deterministic() {
        assert_eq!(blake2b256(b"genius"), blake2b256(b"genius"));
        assert_ne!(blake2b256(b"genius"), blake2b256(b"genius2"));
    }

    #[test]
    fn blake2b256_hex_is_64_chars() {
        assert_eq!(blake2b256_hex(b"genius").len(), 64);
    }

    #[test]
    fn sha256_matches_known_vector() {
        // sha256("") = e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85
        let digest = sha256(b"");
        assert_eq!(
            hex::encode(digest),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
