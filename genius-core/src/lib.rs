//! # genius-core
//!
//! Per-node transaction core of the Genius compute-payment network: a
//! cryptographic account, a UTXO ledger, a small family of signed
//! transactions, and a manager that replicates them through a CRDT-backed
//! key-value store and derives escrow payouts from job results.
//!
//! This crate does not implement the job/subtask processing service, the
//! pub/sub transport, the CRDT datastore, or the zero-knowledge prover —
//! those are external collaborators reached through the [`store`] and
//! [`proof`] traits.

use serde::{Deserialize, Serialize};
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer, used as the raw ordering key for an
    /// [`Address`](crate::account::Address).
    #[derive(Deserialize, Serialize)]
    pub struct U256(4);
}

/// Minion units per whole native token (6 decimal places).
pub const NATIVE_PRECISION: u8 = 6;

/// Maximum fixed-point precision accepted anywhere in the crate.
pub const MAX_PRECISION: u8 = 18;

/// Interval between outbox ticks and the periodic incoming/outgoing scans.
pub const TICK_INTERVAL_MS: u64 = 300;

/// Poll interval used by the `wait_for_*` family.
pub const WAIT_POLL_INTERVAL_MS: u64 = 100;

/// Default test-net identifier used to build the keyspace base.
pub const TEST_NET_ID: u32 = 963;

/// Main-net identifier.
pub const MAIN_NET_ID: u32 = 369;

pub mod account;
pub mod assembly;
pub mod config;
pub mod cost;
pub mod crypto;
pub mod error;
pub mod fixed_point;
pub mod hash;
pub mod keyspace;
pub mod manager;
pub mod migration;
pub mod multi_token;
pub mod proof;
pub mod selector;
pub mod store;
pub mod token_id;
pub mod transaction;

#[cfg(test)]
pub mod test_helpers;
