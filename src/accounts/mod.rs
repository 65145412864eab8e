//! Account store subsystem.
//!
//! # Data Flow
//! ```text
//! create(name)
//!     → types.rs (name rules)
//!     → vault (keypair, seal)
//!     → store.rs (atomic insert-if-absent)
//!         → sled_store.rs (durable) | memory.rs (ephemeral)
//! ```

pub mod memory;
pub mod registry;
pub mod sled_store;
pub mod store;
pub mod types;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::BankResult;

pub use memory::MemoryAccountStore;
pub use registry::AccountRegistry;
pub use sled_store::SledAccountStore;
pub use store::AccountStore;
pub use types::{validate_name, Account, NewAccount};

/// Open the store selected by configuration. An empty path selects the
/// in-memory store.
pub fn open_store(config: &DatabaseConfig) -> BankResult<Arc<dyn AccountStore>> {
    if config.path.is_empty() {
        tracing::warn!("No database path configured, accounts will not survive a restart");
        return Ok(Arc::new(MemoryAccountStore::new()));
    }
    let store = SledAccountStore::open(
        Path::new(&config.path),
        Duration::from_millis(config.timeout_ms),
    )?;
    Ok(Arc::new(store))
}
