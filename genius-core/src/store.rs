//! `ReplicatedKVStore` — the CRDT-backed key-value collaborator consumed
//! by the manager (spec §4.G). The real backend (a gossiping CRDT store)
//! is out of scope for this crate; [`MemoryStore`] is a reference
//! implementation good enough to drive the manager in tests and to back
//! a single-process façade with no real peers.

use crate::error::Result;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, Weak};

/// An atomic batch of puts against one store. Readers never observe a
/// partially-applied batch.
pub trait Batch: Send {
    fn put(&mut self, key: String, value: Vec<u8>);
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Per-key value store with prefix query and atomic batch commit,
/// replicated under a topic to any peer that has joined it.
pub trait ReplicatedKvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn query_key_values(&self, prefix: &str) -> Result<BTreeMap<String, Vec<u8>>>;
    fn begin_transaction(&self) -> Box<dyn Batch>;
}

/// In-memory reference implementation. Peers are other `MemoryStore`
/// instances that have "joined the topic"; a committed batch is applied
/// to this store and then mirrored, key-for-key, into every joined peer —
/// last-writer-wins on conflicting keys, same as the real CRDT contract.
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
    peers: RwLock<Vec<Arc<MemoryStore>>>,
    self_ref: Weak<MemoryStore>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|self_ref| MemoryStore {
            data: RwLock::new(BTreeMap::new()),
            peers: RwLock::new(Vec::new()),
            self_ref: self_ref.clone(),
        })
    }

    /// Registers `peer` as a replication target for every future commit
    /// against this store (one-directional — join the other side too for
    /// bidirectional gossip).
    pub fn join_topic(self: &Arc<Self>, peer: Arc<MemoryStore>) {
        self.peers.write().expect("lock poisoned").push(peer);
    }

    fn apply(&self, writes: &[(String, Vec<u8>)]) {
        let mut data = self.data.write().expect("lock poisoned");
        for (k, v) in writes {
            data.insert(k.clone(), v.clone());
        }
    }
}

impl ReplicatedKvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().expect("lock poisoned").get(key).cloned())
    }

    fn query_key_values(&self, prefix: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        let data = self.data.read().expect("lock poisoned");
        Ok(data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn begin_transaction(&self) -> Box<dyn Batch> {
        Box::new(MemoryBatch {
            writes: Vec::new(),
            target: self.self_ref.upgrade(),
        })
    }
}

struct MemoryBatch {
    writes: Vec<(String, Vec<u8>)>,
    target: Option<Arc<MemoryStore>>,
}

impl Batch for MemoryBatch {
    fn put(&mut self, key: String, value: Vec<u8>) {
        self.writes.push((key, value));
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let Some(target) = self.target else {
            return Ok(());
        };
        target.apply(&self.writes);
        let peers = target.peers.read().expect("lock poisoned").clone();
        for peer in peers {
            peer.apply(&self.writes);
        }
        Ok(())
    }
}
