//! `TransactionManager` — the core of the core (spec §4.H). Owns the
//! outbox queue, the 300 ms tick loop, the processed-transaction indexes,
//! and the ledger-parsing logic that keeps an account's UTXO pool in sync
//! with its own and its peers' committed transactions.
//!
//! Ported in control flow from the original `TransactionManager`'s
//! `Update`/`SendTransaction`/`CheckIncoming`/`CheckOutgoing`/`PayEscrow`,
//! but driven by a `tokio::time::interval` owned by a task spawned over an
//! `Arc<Self>` rather than the original's timer-and-repost chain — the
//! manager never needs a weak reference back to itself.

use crate::account::Account;
use crate::crypto::Address;
use crate::error::{GeniusError, Result};
use crate::fixed_point;
use crate::keyspace;
use crate::proof::ProofBackend;
use crate::selector;
use crate::store::ReplicatedKvStore;
use crate::token_id::TokenId;
use crate::transaction::{
    Escrow, EscrowRelease, InputSpec, Mint, OutputSpec, Transaction, Transfer, UtxoParams,
};
use crate::NATIVE_PRECISION;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// Opens (or creates) the store used to notify `destination`, keyed by its
/// replication topic (`<destination>in`). The real implementation wires
/// this to a networked CRDT store; tests use an in-memory factory.
pub trait PeerStoreFactory: Send + Sync {
    fn open(&self, topic: &str) -> Arc<dyn ReplicatedKvStore>;
}

/// A single worker's share of an escrow payout.
#[derive(Clone, Debug)]
pub struct SubtaskResult {
    pub node_address: Address,
}

/// The result of a completed job, driving escrow payout derivation.
#[derive(Clone, Debug)]
pub struct TaskResult {
    pub subtask_results: Vec<SubtaskResult>,
}

#[derive(Clone, Debug)]
struct ProcessedOutgoing {
    data_hash: String,
}

struct Outbox {
    queue: VecDeque<(Transaction, Option<Vec<u8>>)>,
}

pub struct TransactionManager {
    net_id: u32,
    account: Arc<RwLock<Account>>,
    outbox: Mutex<Outbox>,
    local_outgoing: Arc<dyn ReplicatedKvStore>,
    local_incoming: Arc<dyn ReplicatedKvStore>,
    peer_stores: Mutex<HashMap<Address, Arc<dyn ReplicatedKvStore>>>,
    peer_store_factory: Arc<dyn PeerStoreFactory>,
    proof_backend: Arc<dyn ProofBackend>,
    processed_outgoing: RwLock<HashMap<String, ProcessedOutgoing>>,
    processed_incoming: RwLock<HashMap<String, Transaction>>,
    tick_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TransactionManager {
    pub fn new(
        net_id: u32,
        account: Account,
        local_outgoing: Arc<dyn ReplicatedKvStore>,
        local_incoming: Arc<dyn ReplicatedKvStore>,
        peer_store_factory: Arc<dyn PeerStoreFactory>,
        proof_backend: Arc<dyn ProofBackend>,
    ) -> Arc<Self> {
        Arc::new(TransactionManager {
            net_id,
            account: Arc::new(RwLock::new(account)),
            outbox: Mutex::new(Outbox {
                queue: VecDeque::new(),
            }),
            local_outgoing,
            local_incoming,
            peer_stores: Mutex::new(HashMap::new()),
            peer_store_factory,
            proof_backend,
            processed_outgoing: RwLock::new(HashMap::new()),
            processed_incoming: RwLock::new(HashMap::new()),
            tick_handle: Mutex::new(None),
        })
    }

    pub async fn address(&self) -> Address {
        self.account.read().await.address()
    }

    /// `Init -> Reconciling -> Ticking`: replays previously-committed own
    /// outgoing transactions to rebuild the nonce and UTXO pool, then
    /// starts the 300 ms tick loop.
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        self.reconcile_outgoing().await?;

        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(crate::TICK_INTERVAL_MS));
            loop {
                interval.tick().await;
                if let Err(e) = manager.tick().await {
                    tracing::warn!(error = %e, "transaction manager tick failed");
                }
            }
        });
        *self.tick_handle.lock().await = Some(handle);
        Ok(())
    }

    /// Cancels the tick loop. Any in-flight batch commit already in
    /// progress is allowed to complete.
    pub async fn stop(&self) {
        if let Some(handle) = self.tick_handle.lock().await.take() {
            handle.abort();
        }
    }

    async fn reconcile_outgoing(&self) -> Result<()> {
        let self_address = self.address().await;
        let prefix = keyspace::outgoing_tx_prefix(self.net_id, &self_address);
        let records = self
            .local_outgoing
            .query_key_values(&prefix)
            .map_err(|e| GeniusError::store(format!("{e}")))?;

        let mut max_nonce = None;
        for (key, bytes) in records {
            let tx = match Transaction::deserialize(&bytes) {
                Ok(tx) => tx,
                Err(_) => continue,
            };
            let nonce = tx.envelope().nonce;
            max_nonce = Some(max_nonce.map_or(nonce, |m: u64| m.max(nonce)));
            self.parse_into_ledger(&tx).await;
            self.processed_outgoing.write().await.insert(
                key,
                ProcessedOutgoing {
                    data_hash: tx.data_hash().to_string(),
                },
            );
        }

        if let Some(max_nonce) = max_nonce {
            self.account.write().await.observe_nonce(max_nonce);
        }
        Ok(())
    }

    // ---- public façade operations -------------------------------------

    pub async fn balance(&self, token_id: &TokenId) -> u64 {
        self.account.read().await.balance(token_id)
    }

    pub async fn transfer(
        &self,
        amount: u64,
        destination: Address,
        token_id: TokenId,
    ) -> Result<String> {
        let mut account = self.account.write().await;
        let source = account.address();
        let pool = account.utxo_snapshot();
        let params = selector::select_single(
            &pool,
            source,
            amount,
            destination,
            &token_id,
            crate::crypto::Signature::empty(),
        )?;
        account.lock_utxos(&params.inputs);
        let nonce = account.next_nonce();
        let now = now_nanos();
        drop(account);

        let tx = Transfer::new(source, params, nonce, now, String::new(), String::new())?;
        let hash = tx.data_hash().to_string();
        self.enqueue(tx, None).await;
        Ok(hash)
    }

    pub async fn mint(
        &self,
        amount: u64,
        chain_id: u64,
        token_id: TokenId,
    ) -> Result<String> {
        let mut account = self.account.write().await;
        let source = account.address();
        let nonce = account.next_nonce();
        let now = now_nanos();
        drop(account);

        let tx = Mint::new(source, amount, chain_id, token_id, nonce, now, String::new(), String::new())?;
        let hash = tx.data_hash().to_string();
        let proof = self
            .proof_backend
            .generate(&amount.to_be_bytes(), &[])
            .map_err(|e| GeniusError::ProofGenerationFailed {
                reason: e.to_string(),
            })?;
        let proof = if proof.is_empty() { None } else { Some(proof) };
        self.enqueue(tx, proof).await;
        Ok(hash)
    }

    pub async fn hold_escrow(
        &self,
        amount: u64,
        dev_address: Address,
        peers_cut_fp: u64,
        job_id: String,
    ) -> Result<(String, Address)> {
        let mut account = self.account.write().await;
        let source = account.address();
        let escrow_address = Address::escrow_address_for_job(&job_id);
        let pool = account.utxo_snapshot();
        let params = selector::select_single(
            &pool,
            source,
            amount,
            escrow_address,
            &TokenId::native(),
            crate::crypto::Signature::empty(),
        )?;
        account.lock_utxos(&params.inputs);
        let nonce = account.next_nonce();
        let now = now_nanos();
        drop(account);

        let tx = Escrow::new(
            source,
            params,
            amount,
            dev_address,
            peers_cut_fp,
            job_id,
            nonce,
            now,
            String::new(),
            String::new(),
        )?;
        let hash = tx.data_hash().to_string();
        self.enqueue(tx, None).await;
        Ok((hash, escrow_address))
    }

    /// Derives payouts from a completed job's results and enqueues the
    /// `EscrowRelease`/`Transfer` pair (spec §4.H "Escrow payout
    /// derivation").
    pub async fn pay_escrow(&self, escrow_key: &str, result: TaskResult) -> Result<String> {
        if result.subtask_results.is_empty() {
            return Err(GeniusError::EmptyResult);
        }

        let bytes = self
            .local_outgoing
            .get(escrow_key)
            .map_err(|e| GeniusError::store(format!("{e}")))?
            .ok_or_else(|| GeniusError::EscrowNotFound {
                reason: escrow_key.to_string(),
            })?;
        let escrow_tx = Transaction::deserialize(&bytes)?;
        let Transaction::Escrow(escrow) = &escrow_tx else {
            return Err(GeniusError::EscrowNotFound {
                reason: "record is not an escrow transaction".to_string(),
            });
        };

        let worker_count = result.subtask_results.len() as u64;
        let peers_amount = fixed_point::multiply(escrow.amount, escrow.peers_cut_fp, NATIVE_PRECISION)?
            / worker_count;
        let remainder = escrow.amount - worker_count * peers_amount;

        let mut account = self.account.write().await;
        let source = account.address();
        let nonce_release = account.next_nonce();
        let nonce_transfer = account.next_nonce();
        let now = now_nanos();
        drop(account);

        let mut outputs: Vec<OutputSpec> = result
            .subtask_results
            .iter()
            .map(|s| OutputSpec {
                encrypted_amount: peers_amount,
                destination_address: s.node_address,
                token_id: TokenId::native(),
            })
            .collect();
        outputs.push(OutputSpec {
            encrypted_amount: remainder,
            destination_address: escrow.dev_address,
            token_id: TokenId::native(),
        });

        let transfer_params = UtxoParams {
            inputs: vec![InputSpec {
                txid: escrow_tx.data_hash().to_string(),
                output_index: 0,
                signature: crate::crypto::Signature::empty(),
            }],
            outputs,
        };
        let transfer = Transfer::new(
            escrow.escrow_address(),
            transfer_params,
            nonce_transfer,
            now,
            String::new(),
            String::new(),
        )?;
        let transfer_hash = transfer.data_hash().to_string();

        let release = EscrowRelease::new(
            source,
            UtxoParams::default(),
            escrow.amount,
            escrow.escrow_address(),
            source,
            escrow_tx.data_hash().to_string(),
            nonce_release,
            now,
            String::new(),
            String::new(),
        )?;

        self.enqueue(release, None).await;
        self.enqueue(transfer, None).await;
        Ok(transfer_hash)
    }

    async fn enqueue(&self, tx: Transaction, proof: Option<Vec<u8>>) {
        self.outbox.lock().await.queue.push_back((tx, proof));
    }

    // ---- wait_for_* -----------------------------------------------------

    pub async fn wait_for_outgoing(&self, tx_hash: &str, timeout: Duration) -> bool {
        self.poll_until(timeout, || async {
            self.processed_outgoing
                .read()
                .await
                .values()
                .any(|p| p.data_hash == tx_hash)
        })
        .await
    }

    pub async fn wait_for_incoming(&self, tx_hash: &str, timeout: Duration) -> bool {
        let self_address = self.address().await;
        let key = keyspace::notify_tx(self.net_id, &self_address, tx_hash);
        self.poll_until(timeout, || async {
            self.processed_incoming.read().await.contains_key(&key)
        })
        .await
    }

    pub async fn wait_for_escrow_release(&self, original_hash: &str, timeout: Duration) -> bool {
        self.poll_until(timeout, || async {
            self.processed_incoming.read().await.values().any(|tx| {
                matches!(tx, Transaction::EscrowRelease(r) if r.original_escrow_hash == original_hash)
            })
        })
        .await
    }

    async fn poll_until<F, Fut>(&self, timeout: Duration, mut check: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if check().await {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(crate::WAIT_POLL_INTERVAL_MS)).await;
        }
    }

    // ---- tick -----------------------------------------------------------

    async fn tick(&self) -> Result<()> {
        self.process_outbox_head().await?;
        self.scan_incoming().await?;
        Ok(())
    }

    async fn process_outbox_head(&self) -> Result<()> {
        let head = {
            let outbox = self.outbox.lock().await;
            outbox.queue.front().cloned()
        };
        let Some((mut tx, proof)) = head else {
            return Ok(());
        };

        let self_address = self.address().await;
        let public_key_bytes = {
            let account = self.account.read().await;
            tx.sign(account.private_key())?;
            let mut buf = Vec::new();
            ciborium::into_writer(&account.public_key(), &mut buf)
                .map_err(|e| GeniusError::encoding(format!("public key encode: {e}")))?;
            buf
        };

        let nonce = tx.envelope().nonce;
        let tx_key = keyspace::outgoing_tx(self.net_id, &self_address, tx.type_tag(), nonce);
        let proof_key = keyspace::outgoing_proof(self.net_id, &self_address, nonce);
        let tx_bytes = tx.canonical_bytes()?;

        let mut local_batch = self.local_outgoing.begin_transaction();
        local_batch.put(tx_key.clone(), tx_bytes.clone());
        if let Some(proof_bytes) = &proof {
            local_batch.put(proof_key.clone(), proof_bytes.clone());
        }

        for destination in self.destinations(&tx) {
            let peer_store = self.peer_store(destination).await;
            let notify_tx_key = keyspace::notify_tx(self.net_id, &destination, tx.data_hash());
            let notify_proof_key = keyspace::notify_proof(self.net_id, &destination, tx.data_hash());
            let notify_pubkey_key = keyspace::notify_pubkey(self.net_id, &destination, tx.data_hash());
            let mut peer_batch = peer_store.begin_transaction();
            peer_batch.put(notify_tx_key, tx_bytes.clone());
            peer_batch.put(notify_pubkey_key, public_key_bytes.clone());
            if let Some(proof_bytes) = &proof {
                peer_batch.put(notify_proof_key, proof_bytes.clone());
            }
            if let Err(e) = peer_batch.commit() {
                tracing::warn!(%destination, error = %e, "peer-notify batch failed, will retry via incoming scan");
            }
        }

        local_batch
            .commit()
            .map_err(|e| GeniusError::store(format!("{e}")))?;

        self.parse_into_ledger(&tx).await;
        self.processed_outgoing.write().await.insert(
            tx_key,
            ProcessedOutgoing {
                data_hash: tx.data_hash().to_string(),
            },
        );

        self.outbox.lock().await.queue.pop_front();
        Ok(())
    }

    fn destinations(&self, tx: &Transaction) -> Vec<Address> {
        match tx {
            Transaction::Transfer(t) => {
                let source = t.dag.source_address;
                let mut seen = Vec::new();
                for output in &t.params.outputs {
                    if output.destination_address != source && !seen.contains(&output.destination_address)
                    {
                        seen.push(output.destination_address);
                    }
                }
                seen
            }
            Transaction::EscrowRelease(r) => vec![r.escrow_source],
            Transaction::Mint(_) | Transaction::Escrow(_) => Vec::new(),
        }
    }

    async fn peer_store(&self, destination: Address) -> Arc<dyn ReplicatedKvStore> {
        let mut peers = self.peer_stores.lock().await;
        if let Some(store) = peers.get(&destination) {
            return Arc::clone(store);
        }
        let topic = keyspace::incoming_topic(&destination);
        let store = self.peer_store_factory.open(&topic);
        peers.insert(destination, Arc::clone(&store));
        store
    }

    async fn scan_incoming(&self) -> Result<()> {
        let self_address = self.address().await;
        let prefix = keyspace::notify_tx_prefix(self.net_id, &self_address);
        let records = self
            .local_incoming
            .query_key_values(&prefix)
            .map_err(|e| GeniusError::store(format!("{e}")))?;

        for (key, bytes) in records {
            if self.processed_incoming.read().await.contains_key(&key) {
                continue;
            }

            let tx = match Transaction::deserialize(&bytes) {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::warn!(key, error = %e, "dropping incoming record with malformed body");
                    continue;
                }
            };

            let pubkey_key = keyspace::notify_pubkey(self.net_id, &self_address, tx.data_hash());
            let sender_public_key = match self.local_incoming.get(&pubkey_key) {
                Ok(Some(bytes)) => ciborium::from_reader::<crate::crypto::PublicKey, _>(&bytes[..]).ok(),
                _ => None,
            };
            if let Some(public_key) = sender_public_key {
                match tx.verify_signature(&public_key) {
                    Ok(true) => {}
                    _ => {
                        tracing::warn!(key, "dropping incoming record with invalid signature");
                        continue;
                    }
                }
            } else {
                tracing::warn!(key, "dropping incoming record with no accompanying sender key");
                continue;
            }

            let proof_key = keyspace::notify_proof(self.net_id, &self_address, tx.data_hash());
            if let Ok(Some(proof_bytes)) = self.local_incoming.get(&proof_key) {
                match self.proof_backend.verify(&proof_bytes) {
                    Ok(true) => {}
                    _ => {
                        tracing::warn!(key, "dropping incoming record with invalid proof");
                        continue;
                    }
                }
            }

            self.parse_into_ledger(&tx).await;
            self.processed_incoming.write().await.insert(key, tx);
        }
        Ok(())
    }

    /// Ledger parsing per variant (spec §4.H).
    async fn parse_into_ledger(&self, tx: &Transaction) {
        let self_address = self.address().await;
        let mut account = self.account.write().await;

        match tx {
            Transaction::Mint(m) => {
                if m.dag.source_address == self_address {
                    account.insert_utxo(crate::account::Utxo::new(
                        tx.data_hash().to_string(),
                        0,
                        m.amount,
                        m.token_id,
                    ));
                }
            }
            Transaction::Transfer(t) => {
                for (i, output) in t.params.outputs.iter().enumerate() {
                    if output.destination_address == self_address {
                        account.insert_utxo(crate::account::Utxo::new(
                            tx.data_hash().to_string(),
                            i as u32,
                            output.encrypted_amount,
                            output.token_id,
                        ));
                    }
                }
                if t.dag.source_address == self_address {
                    account.refresh(&t.params.inputs);
                }
            }
            Transaction::Escrow(e) => {
                if e.dag.source_address == self_address {
                    account.refresh(&e.params.inputs);
                }
                if let Some(change) = e.params.outputs.get(1) {
                    if change.destination_address == self_address {
                        account.insert_utxo(crate::account::Utxo::new(
                            tx.data_hash().to_string(),
                            1,
                            change.encrypted_amount,
                            change.token_id,
                        ));
                    }
                }
            }
            Transaction::EscrowRelease(_) => {
                // Ledger effect comes from the accompanying Transfer; this
                // record only authorizes it and is kept for wait_for_* and
                // the original-escrow validation it names.
            }
        }
    }
}

fn now_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests;
