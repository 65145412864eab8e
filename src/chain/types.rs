//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

/// Errors that can occur during chain operations.
///
/// None of these are retried internally; they surface unchanged so the
/// caller can decide whether to re-invoke with a fresh nonce.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection, request or timeout failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Contract call reverted, or the address holds no contract.
    #[error("Contract call failed: {0}")]
    ContractCall(String),

    /// Sender cannot pay for gas (or value).
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Nonce was already used by the time the transaction reached the node.
    #[error("Nonce too low: {0}")]
    NonceTooLow(String),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Transaction was mined but reverted.
    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    /// Transaction was broadcast but not confirmed within the allowed time.
    #[error("Transaction {tx_hash} not confirmed after {secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, secs: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl ChainError {
    pub fn code(&self) -> &'static str {
        match self {
            ChainError::Rpc(_) => "rpc_error",
            ChainError::ContractCall(_) => "contract_call_error",
            ChainError::InsufficientFunds(_) => "insufficient_funds",
            ChainError::NonceTooLow(_) => "nonce_too_low",
            ChainError::GasPriceTooHigh { .. } => "gas_price_too_high",
            ChainError::Reverted { .. } => "transaction_reverted",
            ChainError::ConfirmationTimeout { .. } => "confirmation_timeout",
            ChainError::ChainMismatch { .. } => "chain_mismatch",
        }
    }

    /// Hash of a transaction that already left this process, when the error
    /// happened after broadcast.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            ChainError::Reverted { tx_hash } | ChainError::ConfirmationTimeout { tx_hash, .. } => {
                Some(*tx_hash)
            }
            _ => None,
        }
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Mined transaction outcome, as reported by its receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    pub success: bool,
    pub block_number: Option<u64>,
}
