use anyhow::Result;
use argh::FromArgs;
use genius_core::assembly::{Capabilities, NodeAssembly};
use genius_core::config::AssemblyConfig;
use genius_core::crypto::PrivateKey;
use genius_core::proof::NullProofBackend;
use genius_core::store::MemoryStore;
use tracing::info;

mod util;

#[derive(FromArgs)]
/// The Genius per-node transaction core: assembles a node's account,
/// starts its transaction manager, and runs until interrupted.
struct Args {
    #[argh(option)]
    /// hex-encoded private key scalar (a fresh random key is generated
    /// and printed once on startup if omitted)
    private_key: Option<String>,

    #[argh(option)]
    /// network id override (defaults to GENIUS_NET_ID, see `AssemblyConfig`)
    net_id: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    util::init_tracing();

    let args: Args = argh::from_env();
    let mut config = AssemblyConfig::load();
    if let Some(net_id) = args.net_id {
        config.net_id = net_id;
    }

    let private_key = match &args.private_key {
        Some(hex_key) => PrivateKey::from_bytes(&hex::decode(hex_key)?)?,
        None => {
            let key = PrivateKey::new_key();
            info!(
                private_key = %hex::encode(key.to_bytes()),
                "no --private-key given, generated an ephemeral identity"
            );
            key
        }
    };

    let capabilities = Capabilities {
        local_outgoing: MemoryStore::new(),
        local_incoming: MemoryStore::new(),
        peer_store_factory: util::LocalPeerStoreFactory::new(),
        proof_backend: std::sync::Arc::new(NullProofBackend),
    };

    let assembly = NodeAssembly::new(config, private_key, capabilities)?;
    assembly.start().await?;
    info!(address = %assembly.address().await, "node assembled and running");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping transaction manager");
    assembly.stop().await;

    Ok(())
}
