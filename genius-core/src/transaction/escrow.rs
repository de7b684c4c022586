use super::{DagEnvelope, Transaction, UtxoParams};
use crate::crypto::Address;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Escrows `amount` for a job: consumes `params.inputs`, produces output 0
/// to the job's deterministic escrow address and optional change at
/// output 1. `peers_cut_fp` and the implied `dev_cut` (`1 - peers_cut_fp`,
/// at precision 6) divide the eventual payout between workers and
/// `dev_address`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Escrow {
    pub params: UtxoParams,
    pub amount: u64,
    pub dev_address: Address,
    pub peers_cut_fp: u64,
    pub job_id: String,
    pub dag: DagEnvelope,
}

impl Escrow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_address: Address,
        params: UtxoParams,
        amount: u64,
        dev_address: Address,
        peers_cut_fp: u64,
        job_id: String,
        nonce: u64,
        timestamp: u64,
        prev_hash: String,
        uncle_hash: String,
    ) -> Result<Transaction> {
        let dag = DagEnvelope::new(
            "escrow",
            source_address,
            nonce,
            timestamp,
            prev_hash,
            uncle_hash,
        );
        let mut tx = Transaction::Escrow(Escrow {
            params,
            amount,
            dev_address,
            peers_cut_fp,
            job_id,
            dag,
        });
        tx.stamp_data_hash()?;
        Ok(tx)
    }

    /// The deterministic escrow output address for this job:
    /// `0x||blake2b(job_id)`.
    pub fn escrow_address(&self) -> Address {
        Address::escrow_address_for_job(&self.job_id)
    }
}
