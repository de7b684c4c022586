use super::{DagEnvelope, Transaction};
use crate::crypto::Address;
use crate::error::Result;
use crate::token_id::TokenId;
use serde::{Deserialize, Serialize};

/// Creates a single new UTXO at output index 0, owned by `source_address`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mint {
    pub amount: u64,
    pub chain_id: u64,
    pub token_id: TokenId,
    pub dag: DagEnvelope,
}

impl Mint {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_address: Address,
        amount: u64,
        chain_id: u64,
        token_id: TokenId,
        nonce: u64,
        timestamp: u64,
        prev_hash: String,
        uncle_hash: String,
    ) -> Result<Transaction> {
        let dag = DagEnvelope::new(
            "mint",
            source_address,
            nonce,
            timestamp,
            prev_hash,
            uncle_hash,
        );
        let mut tx = Transaction::Mint(Mint {
            amount,
            chain_id,
            token_id,
            dag,
        });
        tx.stamp_data_hash()?;
        Ok(tx)
    }
}
