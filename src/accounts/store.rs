//! Storage abstraction for account records.

use async_trait::async_trait;

use crate::accounts::types::Account;
use crate::error::BankResult;

/// Durable `name → account` mapping.
///
/// Implementations enforce name uniqueness themselves: `insert` must be an
/// atomic insert-if-absent so that concurrent inserts of one name yield
/// exactly one success. There is no update or delete.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new record. Fails with `DuplicateAccount` if the name exists.
    async fn insert(&self, account: &Account) -> BankResult<()>;

    /// Look up a record by name.
    async fn get(&self, name: &str) -> BankResult<Option<Account>>;
}
