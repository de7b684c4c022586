use genius_core::manager::PeerStoreFactory;
use genius_core::store::{MemoryStore, ReplicatedKvStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}

/// A [`PeerStoreFactory`] good enough to run a single process: every topic
/// gets its own in-memory store, with no actual replication to a remote
/// peer. A networked deployment replaces this with a factory that opens a
/// real CRDT-backed store per topic.
pub struct LocalPeerStoreFactory {
    stores: Mutex<HashMap<String, Arc<MemoryStore>>>,
}

impl LocalPeerStoreFactory {
    pub fn new() -> Arc<Self> {
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
