//! Canonical key layout shared by the manager and the migration engine.
//!
//! Fixed base: `/bc-<net-id>/`. See spec §3 "Keyspace".

use crate::crypto::Address;

pub fn base(net_id: u32) -> String {
    format!("/bc-{net_id}/")
}

pub fn account_base(net_id: u32, addr: &Address) -> String {
    format!("{}{}", base(net_id), addr)
}

/// `<base><addr>/tx/<type>/<nonce>`
pub fn outgoing_tx(net_id: u32, addr: &Address, tx_type: &str, nonce: u64) -> String {
    format!("{}/tx/{tx_type}/{nonce}", account_base(net_id, addr))
}

/// `<base><addr>/proof/<nonce>`
pub fn outgoing_proof(net_id: u32, addr: &Address, nonce: u64) -> String {
    format!("{}/proof/{nonce}", account_base(net_id, addr))
}

/// `<base><addr>/notify/tx/<data_hash>`
pub fn notify_tx(net_id: u32, addr: &Address, data_hash: &str) -> String {
    format!("{}/notify/tx/{data_hash}", account_base(net_id, addr))
}

/// `<base><addr>/notify/proof/<data_hash>`
pub fn notify_proof(net_id: u32, addr: &Address, data_hash: &str) -> String {
    format!("{}/notify/proof/{data_hash}", account_base(net_id, addr))
}

/// `<base><addr>/notify/pubkey/<data_hash>` — the sender's public key,
/// carried alongside the notification so a receiver can verify the
/// envelope signature without a separate address-to-key registry.
pub fn notify_pubkey(net_id: u32, addr: &Address, data_hash: &str) -> String {
    format!("{}/notify/pubkey/{data_hash}", account_base(net_id, addr))
}

/// Prefix under which an account's own outgoing transactions live, used
/// by the startup reconciliation scan.
pub fn outgoing_tx_prefix(net_id: u32, addr: &Address) -> String {
    format!("{}/tx", account_base(net_id, addr))
}

/// Prefix under which notifications addressed to `addr` live, used by the
/// periodic incoming scan.
pub fn notify_tx_prefix(net_id: u32, addr: &Address) -> String {
    format!("{}/notify/tx/", account_base(net_id, addr))
}

/// Persisted directory name for an account's pair of stores, per spec §6:
/// `SuperGNUSNode.TestNet.<channel>.<account-base58>`.
pub fn persisted_dir(channel: &str, addr: &Address) -> String {
    let addr_b58 = bs58::encode(addr.to_string().as_bytes()).into_string();
    format!("SuperGNUSNode.TestNet.{channel}.{addr_b58}")
}

/// Replication topic for an address's incoming/notify store: `<addr>in`.
pub fn incoming_topic(addr: &Address) -> String {
    format!("{addr}in")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    #[test]
    fn outgoing_tx_matches_canonical_shape() {
        let addr = PrivateKey::new_key().public_key().address();
        let key = outgoing_tx(963, &addr, "transfer", 7);
        assert_eq!(key, format!("/bc-963/{addr}/tx/transfer/7"));
    }

    #[test]
    fn notify_tx_matches_canonical_shape() {
        let addr = PrivateKey::new_key().public_key().address();
        let key = notify_tx(963, &addr, "abcd");
        assert_eq!(key, format!("/bc-963/{addr}/notify/tx/abcd"));
    }

    #[test]
    fn notify_prefix_is_a_prefix_of_notify_tx() {
        let addr = PrivateKey::new_key().public_key().address();
        let prefix = notify_tx_prefix(963, &addr);
        let key = notify_tx(963, &addr, "abcd");
        assert!(key.starts_with(&prefix));
    }
}
