//! Per-sender serialization of the nonce-read to broadcast window.

use alloy::primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<Address, Arc<Mutex<()>>>;

/// Lazily created async mutex per sending address.
///
/// An entry lives only while someone holds or waits for it; the last
/// [`SenderGuard`] to drop removes it.
#[derive(Clone, Default)]
pub struct SenderLocks {
    locks: Arc<LockMap>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `sender`'s nonce.
    pub async fn acquire(&self, sender: Address) -> SenderGuard {
        // Clone out of the map so no shard lock is held across the await
        let lock = Arc::clone(self.locks.entry(sender).or_default().value());
        let guard = lock.lock_owned().await;
        SenderGuard {
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
            sender,
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive hold on one sender's nonce sequence.
pub struct SenderGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
    sender: Address,
}

impl Drop for SenderGuard {
    fn drop(&mut self) {
        // Release first so the map holds the only other reference when idle
        self.guard.take();
        self.locks
            .remove_if(&self.sender, |_, lock| Arc::strong_count(lock) == 1);
    }
}
