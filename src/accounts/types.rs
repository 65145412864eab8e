//! Account records and naming rules.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{BankError, BankResult};
use crate::vault::RawPrivateKey;

/// Longest accepted account name.
pub const MAX_NAME_LEN: usize = 100;

/// A stored custodial account. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique human-readable identifier.
    pub name: String,
    /// On-chain address derived from the generated keypair.
    pub address: Address,
    /// Sealed private key, opaque outside the vault.
    pub encrypted_private_key: String,
}

/// Result of account creation: the only time the plaintext key is handed out.
#[derive(Debug)]
pub struct NewAccount {
    pub account: Account,
    pub private_key: RawPrivateKey,
}

/// Check a candidate account name: 1..=100 chars of `[A-Za-z0-9_-]`.
pub fn validate_name(name: &str) -> BankResult<()> {
    if name.is_empty() {
        return Err(BankError::InvalidName("name must not be empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(BankError::InvalidName(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(BankError::InvalidName(
            "name must contain only alphanumeric characters, hyphens, and underscores".to_string(),
        ));
    }
    Ok(())
}
