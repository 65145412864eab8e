//! In-memory account store for ephemeral deployments and tests.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::accounts::store::AccountStore;
use crate::accounts::types::Account;
use crate::error::{BankError, BankResult};

/// A thread-safe map of account name → record.
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    inner: Arc<DashMap<String, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub fn count(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: &Account) -> BankResult<()> {
        // The shard lock held by `entry` makes check-and-insert atomic.
        match self.inner.entry(account.name.clone()) {
            Entry::Occupied(_) => Err(BankError::DuplicateAccount(account.name.clone())),
            Entry::Vacant(slot) => {
                slot.insert(account.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, name: &str) -> BankResult<Option<Account>> {
        Ok(self.inner.get(name).map(|r| r.value().clone()))
    }
}
