//! Account identity and UTXO pool (spec §4.C).

use crate::crypto::{Address, PrivateKey, PublicKey, Signature};
use crate::token_id::TokenId;
use crate::transaction::InputSpec;
use std::collections::HashMap;

/// A spendable output. Two `Utxo`s are distinct whenever their
/// `(txid, output_index)` pair differs, regardless of amount or token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    pub txid: String,
    pub output_index: u32,
    pub amount: u64,
    pub token_id: TokenId,
    pub locked: bool,
}

impl Utxo {
    pub fn new(txid: String, output_index: u32, amount: u64, token_id: TokenId) -> Self {
        Utxo {
            txid,
            output_index,
            amount,
            token_id,
            locked: false,
        }
    }

    fn key(&self) -> (String, u32) {
        (self.txid.clone(), self.output_index)
    }
}

/// Local identity plus the unordered set of outputs it can spend.
pub struct Account {
    private_key: PrivateKey,
    address: Address,
    nonce: u64,
    utxos: HashMap<(String, u32), Utxo>,
}

impl Account {
    pub fn new(private_key: PrivateKey) -> Self {
        let address = private_key.public_key().address();
        Account {
            private_key,
            address,
            nonce: 0,
            utxos: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> PublicKey {
        self.private_key.public_key()
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Consumes the current nonce value and advances the counter.
    pub fn next_nonce(&mut self) -> u64 {
        let n = self.nonce;
        self.nonce += 1;
        n
    }

    /// Fast-forwards the nonce counter if `observed` is not already below
    /// it, used by the manager's startup reconciliation scan.
    pub fn observe_nonce(&mut self, observed: u64) {
        if observed >= self.nonce {
            self.nonce = observed + 1;
        }
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.private_key.sign(message)
    }

    /// Sum of `amount` over unlocked utxos whose token matches (native
    /// aggregates every native-equal utxo into one untyped view).
    pub fn balance(&self, token_id: &TokenId) -> u64 {
        self.utxos
            .values()
            .filter(|u| !u.locked && u.token_id.equals(token_id))
            .map(|u| u.amount)
            .sum()
    }

    pub fn utxos(&self) -> impl Iterator<Item = &Utxo> {
        self.utxos.values()
    }

    /// A snapshot of the full pool, for handing to the selector.
    pub fn utxo_snapshot(&self) -> Vec<Utxo> {
        self.utxos.values().cloned().collect()
    }

    /// Rejects duplicates on `(txid, output_idx)`; insertion order does not
    /// matter to any later operation.
    pub fn insert_utxo(&mut self, utxo: Utxo) {
        self.utxos.entry(utxo.key()).or_insert(utxo);
    }

    /// Removes every utxo listed in `inputs`. A listed utxo that is already
    /// absent is not an error — the same record may be re-parsed more than
    /// once during startup reconciliation.
    pub fn refresh(&mut self, inputs: &[InputSpec]) {
        for input in inputs {
            self.utxos.remove(&(input.txid.clone(), input.output_index));
        }
    }

    /// Marks every `(txid, output_idx)` named by `inputs` as locked, without
    /// removing them — used between selection and commit so a second
    /// selection in the same tick can't double-spend the same outputs.
    pub fn lock_utxos(&mut self, inputs: &[InputSpec]) {
        for input in inputs {
            if let Some(utxo) = self.utxos.get_mut(&(input.txid.clone(), input.output_index)) {
                utxo.locked = true;
            }
        }
    }
}
