//! Durable account store backed by sled.
//!
//! # Layout
//! - tree `accounts`: key = name bytes, value = JSON-encoded [`Account`]
//!
//! # Design Decisions
//! - Uniqueness is a storage-level compare-and-swap against an absent key,
//!   never an in-process lock
//! - Every call runs on the blocking pool under a deadline; an expired
//!   deadline is `DatabaseTimeout`
//! - A write checks its deadline before touching the tree and is awaited to
//!   completion once started, so `DatabaseTimeout` always means nothing was
//!   stored
//! - Inserts are flushed before returning

use async_trait::async_trait;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::accounts::store::AccountStore;
use crate::accounts::types::Account;
use crate::error::{BankError, BankResult};

const ACCOUNTS_TREE: &str = "accounts";

/// Sled-backed [`AccountStore`].
#[derive(Clone)]
pub struct SledAccountStore {
    tree: sled::Tree,
    timeout_duration: Duration,
}

impl SledAccountStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path, timeout_duration: Duration) -> BankResult<Self> {
        let db = sled::open(path).map_err(|e| {
            BankError::Database(format!("Failed to open '{}': {}", path.display(), e))
        })?;
        let tree = db.open_tree(ACCOUNTS_TREE).map_err(db_error)?;

        tracing::info!(
            path = %path.display(),
            accounts = tree.len(),
            "Account store opened"
        );

        Ok(Self {
            tree,
            timeout_duration,
        })
    }

    /// Run a blocking read under the store deadline.
    ///
    /// An abandoned read changes nothing, so the caller stops waiting as soon
    /// as the deadline passes.
    async fn read<T, F>(&self, op: F) -> BankResult<T>
    where
        T: Send + 'static,
        F: FnOnce(sled::Tree) -> BankResult<T> + Send + 'static,
    {
        let tree = self.tree.clone();
        let task = tokio::task::spawn_blocking(move || op(tree));
        match timeout(self.timeout_duration, task).await {
            Ok(joined) => joined.map_err(join_error)?,
            Err(_) => Err(self.timed_out()),
        }
    }

    /// Run a blocking write that must not outlive its deadline.
    ///
    /// The deadline is checked on the blocking thread right before `op`
    /// runs. Once `op` has started its result is awaited and returned as is.
    async fn write<T, F>(&self, op: F) -> BankResult<T>
    where
        T: Send + 'static,
        F: FnOnce(sled::Tree) -> BankResult<T> + Send + 'static,
    {
        let tree = self.tree.clone();
        let deadline = Instant::now() + self.timeout_duration;
        let timed_out = self.timed_out();
        let task = tokio::task::spawn_blocking(move || {
            if Instant::now() >= deadline {
                return Err(timed_out);
            }
            op(tree)
        });
        task.await.map_err(join_error)?
    }

    fn timed_out(&self) -> BankError {
        BankError::DatabaseTimeout(self.timeout_duration.as_millis() as u64)
    }
}

fn join_error(e: tokio::task::JoinError) -> BankError {
    BankError::Database(format!("storage task failed: {}", e))
}

fn db_error(e: sled::Error) -> BankError {
    BankError::Database(e.to_string())
}

#[async_trait]
impl AccountStore for SledAccountStore {
    async fn insert(&self, account: &Account) -> BankResult<()> {
        let name = account.name.clone();
        let value = serde_json::to_vec(account)
            .map_err(|e| BankError::Database(format!("encode account: {}", e)))?;

        self.write(move |tree| {
            let swapped = tree
                .compare_and_swap(name.as_bytes(), None::<&[u8]>, Some(value))
                .map_err(db_error)?;
            if swapped.is_err() {
                return Err(BankError::DuplicateAccount(name));
            }
            tree.flush().map_err(db_error)?;
            Ok(())
        })
        .await
    }

    async fn get(&self, name: &str) -> BankResult<Option<Account>> {
        let key = name.to_string();
        self.read(move |tree| {
            let Some(raw) = tree.get(key.as_bytes()).map_err(db_error)? else {
                return Ok(None);
            };
            let account = serde_json::from_slice(&raw)
                .map_err(|e| BankError::Database(format!("decode account '{}': {}", key, e)))?;
            Ok(Some(account))
        })
        .await
    }
}

impl std::fmt::Debug for SledAccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledAccountStore")
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    fn account(name: &str, byte: u8) -> Account {
        Account {
            name: name.to_string(),
            address: Address::repeat_byte(byte),
            encrypted_private_key: "sealed".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_get_and_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledAccountStore::open(dir.path(), Duration::from_secs(2)).unwrap();

        store.insert(&account("alice", 1)).await.unwrap();
        let err = store.insert(&account("alice", 2)).await.unwrap_err();
        assert!(matches!(err, BankError::DuplicateAccount(_)));

        let found = store.get("alice").await.unwrap().unwrap();
        assert_eq!(found.address, Address::repeat_byte(1));
        assert!(store.get("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SledAccountStore::open(dir.path(), Duration::from_secs(2)).unwrap();
            store.insert(&account("carol", 3)).await.unwrap();
        }

        let reopened = SledAccountStore::open(dir.path(), Duration::from_secs(2)).unwrap();
        let found = reopened.get("carol").await.unwrap().unwrap();
        assert_eq!(found.address, Address::repeat_byte(3));
    }

    #[tokio::test]
    async fn test_timed_out_insert_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledAccountStore::open(dir.path(), Duration::from_nanos(1)).unwrap();

        let result = store.insert(&account("erin", 5)).await;
        // Give any stray blocking work time to land
        tokio::time::sleep(Duration::from_millis(200)).await;
        let stored = store.tree.get("erin").unwrap();

        match result {
            Err(BankError::DatabaseTimeout(_)) => assert!(stored.is_none()),
            Ok(()) => assert!(stored.is_some()),
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    #[tokio::test]
    async fn test_insert_after_timeout_can_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let hurried = SledAccountStore::open(dir.path(), Duration::from_nanos(1)).unwrap();
        let timed_out = matches!(
            hurried.insert(&account("frank", 6)).await,
            Err(BankError::DatabaseTimeout(_))
        );

        let patient = SledAccountStore {
            tree: hurried.tree.clone(),
            timeout_duration: Duration::from_secs(2),
        };
        let retry = patient.insert(&account("frank", 6)).await;
        if timed_out {
            // Nothing was committed, so the retry is a first insert
            retry.unwrap();
        } else {
            assert!(matches!(retry, Err(BankError::DuplicateAccount(_))));
        }
        assert!(patient.get("frank").await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledAccountStore::open(dir.path(), Duration::from_secs(5)).unwrap();

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert(&account("dave", i + 1)).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(BankError::DuplicateAccount(_)) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(successes, 1);
    }
}
