/// Configuration module for the node's assembly-time parameters.
///
/// This module provides a centralized configuration system that supports:
/// - Hardcoded defaults (for a sensible test-net-ready node out of the box)
/// - Environment variable overrides (for flexibility)
///
/// Configuration priority (highest to lowest):
/// 1. Environment variables
/// 2. .env file
/// 3. Hardcoded defaults
use crate::crypto::Address;
use crate::error::{GeniusError, Result};
use crate::token_id::TokenId;
use crate::{MAIN_NET_ID, NATIVE_PRECISION, TEST_NET_ID};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static CONFIG: OnceLock<AssemblyConfig> = OnceLock::new();

/// Everything `NodeAssembly::new` recognizes at construction time (spec
/// §6 "Configuration recognized at assembly time").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Recipient of the developer cut on escrow payouts.
    pub dev_address: Option<String>,

    /// Fraction of escrow paid to workers, `(0, 1]`, as a decimal string
    /// parsed at [`NATIVE_PRECISION`] (e.g. `"0.8"`).
    pub peers_cut: String,

    /// Scale used by `MultiTokenAmount` for this node's primary token,
    /// expressed as native minions per one whole child token.
    pub token_value_in_native: String,

    /// Primary token identifier, hex-encoded; empty means the native
    /// token.
    pub token_id_hex: String,

    /// Root directory for all stores.
    pub base_write_path: String,

    /// If true, advertise and seek peers on the compute channel.
    pub auto_dht: bool,

    /// If true, start the external processing service.
    pub is_processor: bool,

    /// If true, subscribe to all known account topics (sync aggregator).
    pub is_full_node: bool,

    /// Starting TCP port for the pub/sub host and per-peer stores.
    pub base_port: u16,

    /// Network id selecting the keyspace base (`963` test net, `369` main
    /// net, by default).
    pub net_id: u32,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            dev_address: None,
            peers_cut: "0.8".to_string(),
            token_value_in_native: "1".to_string(),
            token_id_hex: String::new(),
            base_write_path: "./genius-data".to_string(),
            auto_dht: false,
            is_processor: false,
            is_full_node: false,
            base_port: 40000,
            net_id: TEST_NET_ID,
        }
    }
}

impl AssemblyConfig {
    /// Loads configuration with the usual priority: environment, then
    /// `.env`, then the hardcoded defaults above.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let default = AssemblyConfig::default();
        Self {
            dev_address: env_var("GENIUS_DEV_ADDRESS").or(default.dev_address),
            peers_cut: env_var("GENIUS_PEERS_CUT").unwrap_or(default.peers_cut),
            token_value_in_native: env_var("GENIUS_TOKEN_VALUE_IN_NATIVE")
                .unwrap_or(default.token_value_in_native),
            token_id_hex: env_var("GENIUS_TOKEN_ID").unwrap_or(default.token_id_hex),
            base_write_path: env_var("GENIUS_BASE_WRITE_PATH").unwrap_or(default.base_write_path),
            auto_dht: parse_env("GENIUS_AUTO_DHT").unwrap_or(default.auto_dht),
            is_processor: parse_env("GENIUS_IS_PROCESSOR").unwrap_or(default.is_processor),
            is_full_node: parse_env("GENIUS_IS_FULL_NODE").unwrap_or(default.is_full_node),
            base_port: parse_env("GENIUS_BASE_PORT").unwrap_or(default.base_port),
            net_id: parse_env("GENIUS_NET_ID").unwrap_or(default.net_id),
        }
    }

    pub fn global() -> &'static AssemblyConfig {
        CONFIG.get_or_init(AssemblyConfig::load)
    }

    pub fn main_net() -> Self {
        Self {
            net_id: MAIN_NET_ID,
            ..Self::default()
        }
    }

    pub fn dev_address(&self) -> Result<Option<Address>> {
        self.dev_address
            .as_deref()
            .map(Address::from_hex)
            .transpose()
    }

    pub fn peers_cut_fp(&self) -> Result<u64> {
        crate::fixed_point::from_string(&self.peers_cut, NATIVE_PRECISION)
    }

    pub fn token_value_in_native_fp(&self) -> Result<u64> {
        crate::fixed_point::from_string(&self.token_value_in_native, NATIVE_PRECISION)
    }

    pub fn token_id(&self) -> Result<TokenId> {
        if self.token_id_hex.is_empty() {
            return Ok(TokenId::native());
        }
        let bytes = hex::decode(&self.token_id_hex)
            .map_err(|e| GeniusError::invalid_amount(format!("bad token id hex: {e}")))?;
        Ok(TokenId::from_bytes(&bytes))
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key)?.parse().ok()
}
