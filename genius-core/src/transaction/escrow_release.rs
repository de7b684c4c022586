use super::{DagEnvelope, Transaction, UtxoParams};
use crate::crypto::Address;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// References an `Escrow` by `original_escrow_hash`; its presence in the
/// same pair of records as an accompanying `Transfer` authorizes that
/// transfer to spend the escrow's output 0. Carries no ledger effect of
/// its own — `params` is typically empty.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EscrowRelease {
    pub params: UtxoParams,
    pub release_amount: u64,
    pub release_address: Address,
    pub escrow_source: Address,
    pub original_escrow_hash: String,
    pub dag: DagEnvelope,
}

impl EscrowRelease {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_address: Address,
        params: UtxoParams,
        release_amount: u64,
        release_address: Address,
        escrow_source: Address,
        original_escrow_hash: String,
        nonce: u64,
        timestamp: u64,
        prev_hash: String,
        uncle_hash: String,
    ) -> Result<Transaction> {
        let dag = DagEnvelope::new(
            "escrow-release",
            source_address,
            nonce,
            timestamp,
            prev_hash,
            uncle_hash,
        );
        let mut tx = Transaction::EscrowRelease(EscrowRelease {
            params,
            release_amount,
            release_address,
            escrow_source,
            original_escrow_hash,
            dag,
        });
        tx.stamp_data_hash()?;
        Ok(tx)
    }
}
