//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bank.
//! All types derive Serde traits for deserialization from config files.
//! Secrets are deliberately absent: see [`crate::config::secrets`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the bank service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BankConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Account store settings.
    pub database: DatabaseConfig,

    /// Chain RPC settings.
    pub chain: ChainConfig,

    /// Faucet (master account) funding settings.
    pub faucet: FaucetConfig,

    /// Transfer orchestration settings.
    pub transfers: TransferConfig,

    /// Symbolic token name to contract address.
    pub tokens: BTreeMap<String, String>,

    /// Per-client rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Total time allowed for one request, in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 60,
            max_body_size: 64 * 1024,
        }
    }
}

/// Account store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory of the sled database. Empty selects the in-memory store.
    pub path: String,

    /// Deadline for a single storage call in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/accounts".to_string(),
            timeout_ms: 2_000,
        }
    }
}

/// Chain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID used for EIP-155 signing.
    pub chain_id: u64,

    /// Verify the node's chain ID at startup.
    pub verify_chain_id: bool,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Gas limit used when estimation fails.
    pub default_gas_limit: u64,

    /// Fixed gas price in gwei. When unset the node's price is used.
    pub gas_price_gwei: Option<f64>,

    /// Gas price multiplier applied to the node's price (1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,

    /// Number of block confirmations required when waiting for receipts.
    pub confirmation_blocks: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1000,
            verify_chain_id: true,
            rpc_timeout_secs: 10,
            default_gas_limit: 100_000,
            gas_price_gwei: None,
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
            confirmation_blocks: 1,
        }
    }
}

/// Faucet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FaucetConfig {
    /// Token handed out by `fund` (symbol or address).
    pub token: String,

    /// Amount handed out by `fund`, decimal, in the token's smallest unit.
    pub amount: String,

    /// Native currency sent to every new account, in gwei. Zero disables.
    pub native_seed_gwei: u64,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            amount: "1000000000000000000".to_string(),
            native_seed_gwei: 10,
        }
    }
}

/// Transfer orchestration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Hold a per-sender lock from nonce read to broadcast.
    pub serialize_per_sender: bool,

    /// Wait for the receipt before reporting success.
    pub wait_for_receipt: bool,

    /// Maximum time to wait for confirmations, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            serialize_per_sender: false,
            wait_for_receipt: false,
            confirmation_timeout_secs: 60,
            poll_interval_ms: 2_000,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per second per client IP.
    pub requests_per_second: u32,

    /// Burst capacity.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_second: 10,
            burst_size: 20,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
