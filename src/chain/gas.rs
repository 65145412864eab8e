//! Gas limit and gas price policy.

use crate::chain::types::{ChainError, ChainResult};

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Headroom added on top of node estimates, in percent.
pub const GAS_BUFFER_PERCENT: u64 = 20;

/// Gas limit for a transaction: the node estimate plus a 20% buffer, or the
/// configured default when no estimate is available.
pub fn buffered_gas_limit(estimate: Option<u64>, default_gas_limit: u64) -> u64 {
    match estimate {
        Some(gas) => gas.saturating_mul(100 + GAS_BUFFER_PERCENT) / 100,
        None => default_gas_limit,
    }
}

/// Apply the multiplier to a node-reported price, refusing prices above the
/// configured ceiling.
pub fn adjusted_gas_price(node_price: u128, multiplier: f64, max_gwei: u64) -> ChainResult<u128> {
    let current_gwei = node_price / WEI_PER_GWEI;
    if current_gwei > max_gwei as u128 {
        return Err(ChainError::GasPriceTooHigh {
            current_gwei: current_gwei.min(u64::MAX as u128) as u64,
            max_gwei,
        });
    }
    Ok((node_price as f64 * multiplier) as u128)
}

/// Fixed price from configuration, in wei.
pub fn fixed_gas_price(gwei: f64) -> u128 {
    (gwei * WEI_PER_GWEI as f64) as u128
}

/// Convert a gwei amount to wei.
pub fn gwei_to_wei(gwei: u64) -> u128 {
    gwei as u128 * WEI_PER_GWEI
}
