//! Secrets loaded from the environment.
//!
//! Secrets never live in the config file. Both are required: a missing or
//! malformed value is a fatal [`BankError::Configuration`].

use crate::error::{BankError, BankResult};
use crate::vault::{RawPrivateKey, VaultKey};

/// Raw private key of the master (faucet) account.
pub const FAUCET_KEY_ENV_VAR: &str = "BANK_FAUCET_PRIVATE_KEY";

/// 32-byte hex key used to seal account keys at rest.
pub const ENCRYPTION_SECRET_ENV_VAR: &str = "BANK_KEY_ENCRYPTION_SECRET";

/// Process-wide secrets. Immutable after startup.
#[derive(Debug)]
pub struct Secrets {
    pub faucet_key: RawPrivateKey,
    pub vault_key: VaultKey,
}

impl Secrets {
    /// Read both secrets from the process environment.
    pub fn from_env() -> BankResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> BankResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let faucet_hex = lookup(FAUCET_KEY_ENV_VAR).ok_or_else(|| {
            BankError::Configuration(format!("Environment variable {} not set", FAUCET_KEY_ENV_VAR))
        })?;
        let faucet_key = RawPrivateKey::from_hex(&faucet_hex).ok_or_else(|| {
            BankError::Configuration(format!("{} is not a 32-byte hex key", FAUCET_KEY_ENV_VAR))
        })?;
        faucet_key
            .signer()
            .map_err(|e| BankError::Configuration(format!("{}: {}", FAUCET_KEY_ENV_VAR, e)))?;

        let secret = lookup(ENCRYPTION_SECRET_ENV_VAR).ok_or_else(|| {
            BankError::Configuration(format!(
                "Environment variable {} not set",
                ENCRYPTION_SECRET_ENV_VAR
            ))
        })?;
        let vault_key = VaultKey::from_hex(&secret)?;

        Ok(Self {
            faucet_key,
            vault_key,
        })
    }
}
