//! Key material, Ethereum-style address derivation, and ECDSA signing
//! over secp256k1. Mirrors the teacher's `crypto` module shape (a
//! `PrivateKey`/`PublicKey`/`Signature` trio backed by `k256`), extended
//! with the keccak-based address derivation the spec requires.

use crate::error::{GeniusError, Result};
use crate::hash::keccak256;
use crate::U256;
use ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A secp256k1 private key.
#[derive(Clone)]
pub struct PrivateKey(pub SigningKey);

impl PrivateKey {
    /// Generates a fresh random key.
    pub fn new_key() -> Self {
        PrivateKey(SigningKey::random(&mut OsRng))
    }

    /// Loads a private key from its raw 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        SigningKey::from_slice(bytes)
            .map(PrivateKey)
            .map_err(|e| GeniusError::invalid_amount(format!("invalid private key: {e}")))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }

    /// Signs `message` as `ECDSA-sign(private_key, SHA-256(message))`,
    /// returning the 64-byte `(r, s)` concatenation. Low-`s` is not
    /// required by the spec; `k256` normalizes to low-`s` regardless,
    /// which is a strict subset of what verifies and doesn't break
    /// round-tripping.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig: EcdsaSignature = self.0.sign(message);
        Signature(sig.to_bytes().to_vec())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(..)")
    }
}

/// A secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "verifying_key_serde")] pub VerifyingKey);

impl PublicKey {
    /// Derives the Ethereum-style address: the last 20 bytes of
    /// `keccak256` of the uncompressed public key's 64-byte point
    /// (excluding the `0x04` SEC1 prefix), widened to a `uint256`.
    pub fn address(&self) -> Address {
        let point = self.0.to_encoded_point(false);
        let full = point.as_bytes();
        // full[0] is the 0x04 prefix; hash only the 64-byte X||Y point.
        let digest = keccak256(&full[1..]);
        let mut addr_bytes = [0u8; 32];
        addr_bytes[12..].copy_from_slice(&digest[12..]);
        Address(U256::from_big_endian(&addr_bytes))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.address())
    }
}

mod verifying_key_serde {
    use k256::ecdsa::VerifyingKey;
    use k256::elliptic_curve::sec1::ToEncodedPoint;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(key: &VerifyingKey, s: S) -> Result<S::Ok, S::Error> {
        key.to_encoded_point(true).as_bytes().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<VerifyingKey, D::Error> {
        let bytes = <Vec<u8>>::deserialize(d)?;
        VerifyingKey::from_sec1_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// A 64-byte ECDSA signature: raw `(r, s)` concatenation.
#[derive(Clone, Serialize, Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Signature(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn empty() -> Self {
        Signature(Vec::new())
    }

    /// Verifies this signature over `SHA-256(message)` under `public_key`.
    pub fn verify(&self, message: &[u8], public_key: &PublicKey) -> bool {
        let Ok(sig) = EcdsaSignature::from_slice(&self.0) else {
            return false;
        };
        public_key.0.verify(message, &sig).is_ok()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0))
    }
}

/// 256-bit address derived from a public key. Two renderings: the
/// canonical lowercase `0x`-prefixed hex string, and the raw integer used
/// as an ordering key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub U256);

impl Address {
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim_start_matches("0x");
        if trimmed.is_empty() || trimmed.len() > 64 || !trimmed.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(GeniusError::invalid_address(format!("bad address: {s}")));
        }
        Ok(Address(
            U256::from_str_radix(trimmed, 16)
                .map_err(|e| GeniusError::invalid_address(format!("{e}")))?,
        ))
    }

    /// Deterministic escrow address for a job: `0x||blake2b(job_id)`,
    /// truncated the same way a public-key digest is.
    pub fn escrow_address_for_job(job_id: &str) -> Self {
        let digest = crate::hash::blake2b256(job_id.as_bytes());
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(&digest[12..]);
        Address(U256::from_big_endian(&bytes))
    }

    pub fn raw(&self) -> U256 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        write!(f, "0x{}", hex::encode(&bytes[12..]))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
