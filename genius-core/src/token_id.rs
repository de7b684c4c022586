//! 32-byte token identifier with canonical ordering and native-token
//! collapsing equality.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A 32-byte token identifier. The all-zero (or otherwise invalid) id is
/// the "native" token; any two native ids compare equal regardless of how
/// each was constructed.
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct TokenId {
    bytes: [u8; 32],
    valid: bool,
}

impl TokenId {
    /// The native token id: all-zero, marked invalid (matches the
    /// `from_bytes(&[])` result so every "no token id given" path produces
    /// the same value).
    pub fn native() -> Self {
        TokenId {
            bytes: [0u8; 32],
            valid: false,
        }
    }

    /// Builds a `TokenId` from a byte slice. Zero-length input is invalid
    /// (native). 1..=32 bytes are right-justified into the 32-byte buffer
    /// (left-padded with zeros) and marked valid. Slices longer than 32
    /// bytes are rejected the same way as empty ones — treated as native —
    /// since there's no safe way to fit them.
    pub fn from_bytes(data: &[u8]) -> Self {
        if data.is_empty() || data.len() > 32 {
            return Self::native();
        }
        let mut bytes = [0u8; 32];
        let start = 32 - data.len();
        bytes[start..].copy_from_slice(data);
        TokenId { bytes, valid: true }
    }

    pub fn bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// True if this id is the native token: either explicitly invalid, or
    /// all bytes are zero (even if marked valid, e.g. `from_bytes(&[0])`).
    pub fn is_native(&self) -> bool {
        !self.valid || self.bytes.iter().all(|b| *b == 0)
    }

    /// Native-aware equality: two native ids are always equal, otherwise
    /// compare by raw bytes. This is deliberately weaker than `PartialEq`
    /// (used at the call sites the spec names — balance aggregation and
    /// selector matching — not as the derive used for map keys).
    pub fn equals(&self, other: &TokenId) -> bool {
        if self.is_native() && other.is_native() {
            return true;
        }
        self.bytes == other.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::native()
    }
}

impl PartialEq for TokenId {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes && self.valid == other.valid
    }
}
impl Eq for TokenId {}

impl PartialOrd for TokenId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for TokenId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl std::hash::Hash for TokenId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.to_hex())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slice_is_native() {
        assert!(TokenId::from_bytes(&[]).is_native());
    }

    #[test]
    fn short_slice_is_right_justified() {
        let id = TokenId::from_bytes(&[0x50]);
        assert_eq!(id.bytes()[31], 0x50);
        assert!(id.bytes()[..31].iter().all(|b| *b == 0));
        assert!(!id.is_native());
    }

    #[test]
    fn two_native_ids_are_equal_regardless_of_source() {
        let a = TokenId::native();
        let b = TokenId::from_bytes(&[]);
        let c = TokenId::from_bytes(&[0u8; 32]);
        assert!(a.equals(&b));
        assert!(a.equals(&c));
        assert!(b.equals(&c));
    }

    #[test]
    fn distinct_non_native_ids_are_not_equal() {
        let a = TokenId::from_bytes(&[0x50]);
        let b = TokenId::from_bytes(&[0x51]);
        assert!(!a.equals(&b));
    }

    #[test]
    fn ordering_is_lexicographic_over_bytes() {
        let a = TokenId::from_bytes(&[0x01]);
        let b = TokenId::from_bytes(&[0x02]);
        assert!(a < b);
    }
}
