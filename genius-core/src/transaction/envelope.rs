//! The signed DAG envelope shared by every transaction variant (spec §3,
//! §4.E).

use crate::crypto::{Address, PrivateKey, PublicKey, Signature};
use crate::error::{GeniusError, Result};
use serde::{Deserialize, Serialize};

/// Fields common to every transaction variant. `data_hash` and `signature`
/// start empty and are filled in by the construction sequence described on
/// [`super::Transaction`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DagEnvelope {
    pub prev_hash: String,
    pub nonce: u64,
    pub source_address: Address,
    pub timestamp: u64,
    pub uncle_hash: String,
    pub data_hash: String,
    pub signature: Signature,
    pub type_tag: String,
}

impl DagEnvelope {
    pub fn new(
        type_tag: &str,
        source_address: Address,
        nonce: u64,
        timestamp: u64,
        prev_hash: String,
        uncle_hash: String,
    ) -> Self {
        DagEnvelope {
            prev_hash,
            nonce,
            source_address,
            timestamp,
            uncle_hash,
            data_hash: String::new(),
            signature: Signature::empty(),
            type_tag: type_tag.to_string(),
        }
    }

    /// Signs this envelope in place: clears the signature, serializes the
    /// envelope alone, and assigns the resulting signature. `PrivateKey::sign`
    /// applies `SHA-256` internally, so the message passed here is the
    /// envelope's serialized bytes, not a pre-hashed digest. `data_hash` must
    /// already be set — the signature thereby commits transitively to the
    /// whole transaction body through it.
    pub fn sign(&mut self, private_key: &PrivateKey) -> Result<()> {
        self.signature = Signature::empty();
        let bytes = envelope_bytes(self)?;
        self.signature = private_key.sign(&bytes);
        Ok(())
    }

    /// Verifies the signature over this envelope's canonical bytes with the
    /// signature field cleared.
    pub fn verify_signature(&self, public_key: &PublicKey) -> Result<bool> {
        let mut cleared = self.clone();
        cleared.signature = Signature::empty();
        let bytes = envelope_bytes(&cleared)?;
        Ok(self.signature.verify(&bytes, public_key))
    }
}

fn envelope_bytes(envelope: &DagEnvelope) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(envelope, &mut buf)
        .map_err(|e| GeniusError::encoding(format!("envelope encode: {e}")))?;
    Ok(buf)
}
