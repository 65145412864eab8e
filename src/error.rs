//! Error taxonomy for the bank.
//!
//! Every failure path returns a distinguishable variant. Chain failures are
//! nested as [`ChainError`] so the orchestration layer can surface them
//! unchanged.

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

use crate::chain::ChainError;

/// Errors produced by the bank core.
#[derive(Debug, Error)]
pub enum BankError {
    /// Missing or malformed startup configuration (fatal).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An account with this name already exists.
    #[error("Account with name '{0}' already exists")]
    DuplicateAccount(String),

    /// No account is stored under this name.
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    /// Account name does not satisfy the naming rules.
    #[error("Invalid account name: {0}")]
    InvalidName(String),

    /// Transfer amount must be strictly positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Sender's token balance does not cover the transfer.
    #[error("Insufficient balance. Available: {available}, Required: {required}")]
    InsufficientBalance { available: U256, required: U256 },

    /// Token identifier is neither a configured symbol nor an address.
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Transaction could not be built or signed from the given inputs.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Stored key ciphertext is corrupt or sealed under another key.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Storage layer I/O or serialization failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Storage call exceeded its deadline.
    #[error("Database timeout after {0} ms")]
    DatabaseTimeout(u64),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl BankError {
    /// Stable machine-readable code for API responses and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            BankError::Configuration(_) => "configuration_error",
            BankError::DuplicateAccount(_) => "duplicate_account",
            BankError::AccountNotFound(_) => "account_not_found",
            BankError::InvalidName(_) => "invalid_name",
            BankError::InvalidAmount(_) => "invalid_amount",
            BankError::InsufficientBalance { .. } => "insufficient_balance",
            BankError::UnknownToken(_) => "unknown_token",
            BankError::InvalidTransaction(_) => "invalid_transaction",
            BankError::Decryption(_) => "decryption_error",
            BankError::Encryption(_) => "encryption_error",
            BankError::Database(_) => "database_error",
            BankError::DatabaseTimeout(_) => "database_timeout",
            BankError::Chain(e) => e.code(),
        }
    }

    /// Hash of an already broadcast transaction this error refers to.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            BankError::Chain(e) => e.tx_hash(),
            _ => None,
        }
    }
}

/// Result type for bank operations.
pub type BankResult<T> = Result<T, BankError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BankError::DuplicateAccount("alice".to_string());
        assert_eq!(err.to_string(), "Account with name 'alice' already exists");

        let err = BankError::DatabaseTimeout(250);
        assert_eq!(err.to_string(), "Database timeout after 250 ms");

        let err = BankError::InsufficientBalance {
            available: U256::from(10),
            required: U256::from(100),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance. Available: 10, Required: 100"
        );
        assert_eq!(err.code(), "insufficient_balance");
    }

    #[test]
    fn test_chain_errors_keep_their_code() {
        let err = BankError::from(ChainError::NonceTooLow("nonce too low".into()));
        assert_eq!(err.code(), "nonce_too_low");
        assert!(matches!(err, BankError::Chain(ChainError::NonceTooLow(_))));
    }
}
