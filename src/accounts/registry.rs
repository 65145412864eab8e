//! Account creation and lookup on top of a store and the key vault.

use std::sync::Arc;

use crate::accounts::store::AccountStore;
use crate::accounts::types::{validate_name, Account, NewAccount};
use crate::error::{BankError, BankResult};
use crate::observability::metrics;
use crate::vault::KeyVault;

/// Creates accounts (keypair + sealed key) and resolves names.
#[derive(Clone)]
pub struct AccountRegistry {
    store: Arc<dyn AccountStore>,
    vault: Arc<KeyVault>,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn AccountStore>, vault: Arc<KeyVault>) -> Self {
        Self { store, vault }
    }

    /// Create a named account with a fresh keypair.
    ///
    /// The returned [`NewAccount`] carries the plaintext key for one-time
    /// disclosure; only the sealed key is persisted.
    pub async fn create(&self, name: &str) -> BankResult<NewAccount> {
        validate_name(name)?;

        let (address, private_key) = self.vault.generate_keypair();
        let account = Account {
            name: name.to_string(),
            address,
            encrypted_private_key: self.vault.encrypt(&private_key)?,
        };

        if let Err(e) = self.store.insert(&account).await {
            if matches!(e, BankError::DuplicateAccount(_)) {
                tracing::warn!(name = %name, "Account already exists");
            }
            return Err(e);
        }

        metrics::record_account_created();
        tracing::info!(name = %name, address = %address, "Account created");

        Ok(NewAccount {
            account,
            private_key,
        })
    }

    /// Resolve an account by name.
    pub async fn get_by_name(&self, name: &str) -> BankResult<Account> {
        match self.store.get(name).await? {
            Some(account) => Ok(account),
            None => {
                tracing::warn!(name = %name, "Account not found");
                Err(BankError::AccountNotFound(name.to_string()))
            }
        }
    }

    /// The vault used to seal this registry's keys.
    pub fn vault(&self) -> &KeyVault {
        &self.vault
    }
}
