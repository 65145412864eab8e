//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (faucet token names a configured token)
//! - Validate value ranges (timeouts > 0, gas limit covers a transfer)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BankConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::{Address, U256};
use std::net::SocketAddr;

use crate::chain::token::TokenRef;
use crate::config::schema::BankConfig;

/// Minimum gas any transaction consumes.
const INTRINSIC_GAS: u64 = 21_000;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &BankConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }
    if config.database.timeout_ms == 0 {
        errors.push(ValidationError::new("database.timeout_ms", "must be > 0"));
    }

    let chain = &config.chain;
    if chain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new(
            "chain.rpc_url",
            format!("'{}' is not a valid URL", chain.rpc_url),
        ));
    }
    for (i, failover) in chain.failover_urls.iter().enumerate() {
        if failover.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                format!("chain.failover_urls[{}]", i),
                format!("'{}' is not a valid URL", failover),
            ));
        }
    }
    if chain.chain_id == 0 {
        errors.push(ValidationError::new("chain.chain_id", "must be > 0"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.default_gas_limit < INTRINSIC_GAS {
        errors.push(ValidationError::new(
            "chain.default_gas_limit",
            format!("must be at least {}", INTRINSIC_GAS),
        ));
    }
    if chain.gas_price_multiplier <= 0.0 {
        errors.push(ValidationError::new("chain.gas_price_multiplier", "must be > 0"));
    }
    if matches!(chain.gas_price_gwei, Some(p) if p <= 0.0) {
        errors.push(ValidationError::new("chain.gas_price_gwei", "must be > 0 when set"));
    }

    for (symbol, address) in &config.tokens {
        if address.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                format!("tokens.{}", symbol),
                format!("'{}' is not a contract address", address),
            ));
        }
    }

    match config.faucet.amount.parse::<U256>() {
        Ok(amount) if amount.is_zero() => {
            errors.push(ValidationError::new("faucet.amount", "must be > 0"));
        }
        Ok(_) => {}
        Err(_) => {
            errors.push(ValidationError::new(
                "faucet.amount",
                format!("'{}' is not a decimal integer", config.faucet.amount),
            ));
        }
    }
    if !config.faucet.token.is_empty()
        && TokenRef::parse(&config.faucet.token)
            .resolve(&config.tokens)
            .is_err()
    {
        errors.push(ValidationError::new(
            "faucet.token",
            format!("'{}' is neither an address nor a configured token", config.faucet.token),
        ));
    }

    if config.rate_limit.enabled && config.rate_limit.requests_per_second == 0 {
        errors.push(ValidationError::new("rate_limit.requests_per_second", "must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
