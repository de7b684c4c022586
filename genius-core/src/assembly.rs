//! `NodeAssembly` — the façade a binary wires up and calls into (spec
//! §4.J). Owns the account's `TransactionManager` plus the injected
//! collaborators that would otherwise be reached through global
//! singletons/factories in the original: the replicated stores, the peer
//! store factory, and the proof backend.

use crate::account::Account;
use crate::config::AssemblyConfig;
use crate::crypto::{Address, PrivateKey};
use crate::error::Result;
use crate::manager::{PeerStoreFactory, TaskResult, TransactionManager};
use crate::proof::ProofBackend;
use crate::store::ReplicatedKvStore;
use crate::token_id::TokenId;
use std::sync::Arc;
use std::time::Duration;

/// The set of capabilities `NodeAssembly` needs injected rather than
/// constructing itself — the Rust analogue of the original's global
/// singletons/factories for the store backend, peer transport, and
/// prover.
pub struct Capabilities {
    pub local_outgoing: Arc<dyn ReplicatedKvStore>,
    pub local_incoming: Arc<dyn ReplicatedKvStore>,
    pub peer_store_factory: Arc<dyn PeerStoreFactory>,
    pub proof_backend: Arc<dyn ProofBackend>,
}

pub struct NodeAssembly {
    config: AssemblyConfig,
    manager: Arc<TransactionManager>,
}

impl NodeAssembly {
    /// Fails instead of panicking on a malformed config — the idiomatic
    /// analogue of the original's exception-throwing constructor.
    pub fn new(config: AssemblyConfig, private_key: PrivateKey, capabilities: Capabilities) -> Result<Self> {
        config.dev_address()?;
        config.peers_cut_fp()?;
        config.token_value_in_native_fp()?;
        config.token_id()?;

        let account = Account::new(private_key);
        let manager = TransactionManager::new(
            config.net_id,
            account,
            capabilities.local_outgoing,
            capabilities.local_incoming,
            capabilities.peer_store_factory,
            capabilities.proof_backend,
        );

        Ok(NodeAssembly { config, manager })
    }

    pub async fn start(&self) -> Result<()> {
        self.manager.start().await
    }

    pub async fn stop(&self) {
        self.manager.stop().await;
    }

    pub async fn address(&self) -> Address {
        self.manager.address().await
    }

    pub async fn get_balance(&self, token_id: Option<TokenId>) -> u64 {
        self.manager
            .balance(&token_id.unwrap_or_else(TokenId::native))
            .await
    }

    pub async fn transfer(&self, amount: u64, destination: Address, token_id: Option<TokenId>) -> Result<String> {
        self.manager
            .transfer(amount, destination, token_id.unwrap_or_else(TokenId::native))
            .await
    }

    pub async fn mint(&self, amount: u64, chain_id: u64, token_id: Option<TokenId>) -> Result<String> {
        self.manager
            .mint(amount, chain_id, token_id.unwrap_or_else(TokenId::native))
            .await
    }

    pub async fn hold_escrow(&self, amount: u64, job_id: String) -> Result<(String, Address)> {
        let dev_address = self.config.dev_address()?.unwrap_or_else(Self::zero_address);
        let peers_cut = self.config.peers_cut_fp()?;
        self.manager
            .hold_escrow(amount, dev_address, peers_cut, job_id)
            .await
    }

    /// Derives and enqueues the payout for a completed job (spec calls
    /// this `process_image`: the entry point the external processing
    /// service invokes once it has a `TaskResult` to settle).
    pub async fn process_image(&self, escrow_key: &str, result: TaskResult) -> Result<String> {
        self.manager.pay_escrow(escrow_key, result).await
    }

    pub fn parse_child_tokens(&self, text: &str) -> Result<u64> {
        crate::multi_token::parse_child_tokens(text, self.config.token_value_in_native_fp()?)
    }

    pub fn format_child_tokens(&self, native_minions: u64) -> Result<String> {
        crate::multi_token::format_child_tokens(native_minions, self.config.token_value_in_native_fp()?)
    }

    pub async fn wait_for_outgoing(&self, tx_hash: &str, timeout: Duration) -> bool {
        self.manager.wait_for_outgoing(tx_hash, timeout).await
    }

    pub async fn wait_for_incoming(&self, tx_hash: &str, timeout: Duration) -> bool {
        self.manager.wait_for_incoming(tx_hash, timeout).await
    }

    pub async fn wait_for_escrow_release(&self, original_hash: &str, timeout: Duration) -> bool {
        self.manager.wait_for_escrow_release(original_hash, timeout).await
    }

    /// Used when no `dev_address` is configured — escrows can still be
    /// held, with the developer cut going to the burn address until a
    /// real one is set.
    fn zero_address() -> Address {
        Address::from_hex("0x0000000000000000000000000000000000000000").unwrap()
    }
}
