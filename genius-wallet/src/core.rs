use anyhow::{Context, Result};
use genius_core::assembly::{Capabilities, NodeAssembly};
use genius_core::config::AssemblyConfig;
use genius_core::crypto::{Address, PrivateKey};
use genius_core::manager::PeerStoreFactory;
use genius_core::proof::NullProofBackend;
use genius_core::store::{MemoryStore, ReplicatedKvStore};
use genius_core::token_id::TokenId;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Wraps a [`NodeAssembly`] with the wallet's own key persistence, so the
/// CLI can be pointed at a key file the way the original pointed at a
/// key-pair on disk, without needing a running node process to talk to.
pub struct Core {
    assembly: NodeAssembly,
}

impl Core {
    pub async fn load(key_path: &Path, net_id: Option<u32>) -> Result<Self> {
        let private_key = load_or_create_key(key_path)?;

        let mut config = AssemblyConfig::load();
        if let Some(net_id) = net_id {
            config.net_id = net_id;
        }

        let capabilities = Capabilities {
            local_outgoing: MemoryStore::new(),
            local_incoming: MemoryStore::new(),
            peer_store_factory: LocalPeerStoreFactory::new(),
            proof_backend: Arc::new(NullProofBackend),
        };

        let assembly = NodeAssembly::new(config, private_key, capabilities)?;
        assembly.start().await?;
        let core = Core { assembly };
        info!(address = %core.address().await, "wallet assembled");
        Ok(core)
    }

    pub async fn address(&self) -> Address {
        self.assembly.address().await
    }

    pub async fn balance(&self, token_id: Option<TokenId>) -> u64 {
        self.assembly.get_balance(token_id).await
    }

    pub async fn mint(&self, amount: u64, chain_id: u64, token_id: Option<TokenId>) -> Result<String> {
        debug!(amount, chain_id, "minting");
        Ok(self.assembly.mint(amount, chain_id, token_id).await?)
    }

    pub async fn transfer(&self, amount: u64, destination: Address, token_id: Option<TokenId>) -> Result<String> {
        debug!(amount, %destination, "transferring");
        Ok(self.assembly.transfer(amount, destination, token_id).await?)
    }

    pub async fn hold_escrow(&self, amount: u64, job_id: String) -> Result<(String, Address)> {
        debug!(amount, %job_id, "holding escrow");
        Ok(self.assembly.hold_escrow(amount, job_id).await?)
    }

    pub async fn wait_for_outgoing(&self, tx_hash: &str, timeout: Duration) -> bool {
        self.assembly.wait_for_outgoing(tx_hash, timeout).await
    }

    pub async fn shutdown(&self) {
        self.assembly.stop().await;
    }
}

/// A [`PeerStoreFactory`] with no remote peers to reach: a wallet run from
/// the command line settles only against its own account, so every topic
/// it ever opens is one it already owns.
struct LocalPeerStoreFactory {
    stores: Mutex<HashMap<String, Arc<MemoryStore>>>,
}

impl LocalPeerStoreFactory {
    fn new() -> Arc<Self> {
        Arc::new(LocalPeerStoreFactory {
            stores: Mutex::new(HashMap::new()),
        })
    }
}

impl PeerStoreFactory for LocalPeerStoreFactory {
    fn open(&self, topic: &str) -> Arc<dyn ReplicatedKvStore> {
        let mut stores = self.stores.lock().expect("lock poisoned");
        stores
            .entry(topic.to_string())
            .or_insert_with(MemoryStore::new)
            .clone()
    }
}

fn load_or_create_key(path: &Path) -> Result<PrivateKey> {
    if path.exists() {
        let hex_key =
            std::fs::read_to_string(path).with_context(|| format!("reading key file {path:?}"))?;
        let bytes = hex::decode(hex_key.trim())?;
        Ok(PrivateKey::from_bytes(&bytes)?)
    } else {
        let key = PrivateKey::new_key();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, hex::encode(key.to_bytes()))
            .with_context(|| format!("writing key file {path:?}"))?;
        info!(path = %path.display(), "generated a new wallet key");
        Ok(key)
    }
}
