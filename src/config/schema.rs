//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the faucet.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FaucetConfig {
    /// RPC endpoint settings.
    pub blockchain: BlockchainConfig,

    /// Key file locations.
    pub keys: KeysConfig,

    /// Fee pricing.
    pub fees: FeeConfig,

    /// Confirmation tracking.
    pub confirmation: ConfirmationConfig,

    /// Time-boxed single calls.
    pub race: RaceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Expected chain ID. When unset it is queried before signing.
    pub chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            // Local L2 devnet
            rpc_url: "http://0.0.0.0:9545".to_string(),
            failover_urls: Vec::new(),
            chain_id: None,
            rpc_timeout_secs: 10,
        }
    }
}

/// Key file locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Folder holding the key files, relative to the working directory
    /// unless absolute.
    pub folder: PathBuf,
    pub account_a: String,
    pub account_b: String,
    pub faucet: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from(".keys"),
            account_a: "accountA".to_string(),
            account_b: "accountB".to_string(),
            faucet: "faucet".to_string(),
        }
    }
}

/// How transactions are priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeMode {
    /// Legacy price from the node's suggestion.
    Legacy,
    /// EIP-1559 tip and cap derived from the node's suggestion.
    #[default]
    Dynamic,
    /// Fixed legacy price, no fee query.
    Static,
}

/// Fee configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeeConfig {
    pub mode: FeeMode,

    /// Gas price for `static` mode, in wei.
    pub static_gas_price_wei: u128,

    /// Gas price multiplier for `legacy` mode (1.0 = as suggested).
    pub gas_price_multiplier: f64,

    /// Maximum price per gas in gwei (protection against spikes). 0 disables.
    pub max_gas_price_gwei: u64,

    /// Margin added to estimated gas, in percent.
    pub gas_limit_margin_percent: u64,

    /// Gas limit for transfers priced without an estimate.
    pub transfer_gas_limit: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            mode: FeeMode::Dynamic,
            static_gas_price_wei: 1_000_000_000,
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: 500,
            gas_limit_margin_percent: 20,
            transfer_gas_limit: 21_000,
        }
    }
}

/// How inclusion of a submitted transaction is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStrategy {
    /// Poll for the receipt by transaction hash.
    #[default]
    Receipt,
    /// Poll the submitter's confirmed nonce until it changes.
    NonceDelta,
}

impl ConfirmationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::NonceDelta => "nonce_delta",
        }
    }
}

/// Confirmation tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub strategy: ConfirmationStrategy,

    /// Delay between polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum polls before giving up. 0 polls until cancelled.
    pub max_attempts: u32,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            strategy: ConfirmationStrategy::Receipt,
            poll_interval_ms: 1000,
            max_attempts: 0,
        }
    }
}

/// Time limit for single raced calls such as a balance check.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RaceConfig {
    pub timeout_secs: u64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self { timeout_secs: 3 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or an EnvFilter directive.
    pub log_level: String,

    /// Emit logs as JSON.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
