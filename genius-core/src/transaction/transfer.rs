use super::{DagEnvelope, Transaction, UtxoParams};
use crate::crypto::Address;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Consumes `params.inputs`, produces `params.outputs`. The sum of input
/// amounts must equal the sum of output amounts per token id — enforced by
/// the caller (the selector, or payout construction), not by this type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transfer {
    pub params: UtxoParams,
    pub dag: DagEnvelope,
}

impl Transfer {
    pub fn new(
        source_address: Address,
        params: UtxoParams,
        nonce: u64,
        timestamp: u64,
        prev_hash: String,
        uncle_hash: String,
    ) -> Result<Transaction> {
        let dag = DagEnvelope::new(
            "transfer",
            source_address,
            nonce,
            timestamp,
            prev_hash,
            uncle_hash,
        );
        let mut tx = Transaction::Transfer(Transfer { params, dag });
        tx.stamp_data_hash()?;
        Ok(tx)
    }
}
