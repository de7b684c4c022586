//! The transaction family: a tagged sum of value-carrying variants sharing
//! a signed [`DagEnvelope`] (spec §3, §4.E).

mod envelope;
mod escrow;
mod escrow_release;
mod mint;
mod transfer;

pub use envelope::DagEnvelope;
pub use escrow::Escrow;
pub use escrow_release::EscrowRelease;
pub use mint::Mint;
pub use transfer::Transfer;

use crate::crypto::{Address, PrivateKey, PublicKey, Signature};
use crate::error::{GeniusError, Result};
use crate::hash::blake2b256_hex;
use serde::{Deserialize, Serialize};

/// A previously-produced output being spent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputSpec {
    pub txid: String,
    pub output_index: u32,
    pub signature: Signature,
}

/// A newly-produced output. "Encrypted" reserves the field name for a
/// future homomorphic commitment; today it carries the amount verbatim.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputSpec {
    pub encrypted_amount: u64,
    pub destination_address: Address,
    pub token_id: crate::token_id::TokenId,
}

/// The `(inputs, outputs)` bundle a `UtxoSelector` run produces and that
/// `Transfer`/`Escrow`/`EscrowRelease` all carry.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UtxoParams {
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
}

/// The transaction family, tagged by `type_tag` on the shared envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Transaction {
    Mint(Mint),
    Transfer(Transfer),
    Escrow(Escrow),
    EscrowRelease(EscrowRelease),
}

impl Transaction {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Transaction::Mint(_) => "mint",
            Transaction::Transfer(_) => "transfer",
            Transaction::Escrow(_) => "escrow",
            Transaction::EscrowRelease(_) => "escrow-release",
        }
    }

    pub fn envelope(&self) -> &DagEnvelope {
        match self {
            Transaction::Mint(t) => &t.dag,
            Transaction::Transfer(t) => &t.dag,
            Transaction::Escrow(t) => &t.dag,
            Transaction::EscrowRelease(t) => &t.dag,
        }
    }

    pub fn envelope_mut(&mut self) -> &mut DagEnvelope {
        match self {
            Transaction::Mint(t) => &mut t.dag,
            Transaction::Transfer(t) => &mut t.dag,
            Transaction::Escrow(t) => &mut t.dag,
            Transaction::EscrowRelease(t) => &mut t.dag,
        }
    }

    pub fn source_address(&self) -> Address {
        self.envelope().source_address
    }

    pub fn data_hash(&self) -> &str {
        &self.envelope().data_hash
    }

    /// Recomputes and assigns `data_hash` in place: `Blake2b-256` of this
    /// transaction serialized with both `data_hash` and `signature`
    /// cleared. Called once by each variant's constructor.
    pub(crate) fn stamp_data_hash(&mut self) -> Result<()> {
        {
            let env = self.envelope_mut();
            env.data_hash.clear();
            env.signature = Signature::empty();
        }
        let bytes = self.canonical_bytes()?;
        let hash = blake2b256_hex(&bytes);
        self.envelope_mut().data_hash = hash;
        Ok(())
    }

    /// Signs the envelope in place with `private_key`, per the outbox
    /// tick's construction sequence (spec §4.H step 2).
    pub fn sign(&mut self, private_key: &PrivateKey) -> Result<()> {
        self.envelope_mut().sign(private_key)
    }

    /// Re-hashes the body with `data_hash`/`signature` cleared and compares
    /// against the stored `data_hash`.
    pub fn verify_data_hash(&self) -> Result<bool> {
        let mut cleared = self.clone();
        {
            let env = cleared.envelope_mut();
            env.data_hash.clear();
            env.signature = Signature::empty();
        }
        let bytes = cleared.canonical_bytes()?;
        Ok(blake2b256_hex(&bytes) == self.data_hash())
    }

    pub fn verify_signature(&self, public_key: &PublicKey) -> Result<bool> {
        self.envelope().verify_signature(public_key)
    }

    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| GeniusError::encoding(format!("transaction encode: {e}")))?;
        Ok(buf)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes)
            .map_err(|e| GeniusError::encoding(format!("transaction decode: {e}")))
    }
}

#[cfg(test)]
mod tests;
