//! Custodial ERC-20 bank on top of an EVM chain.
//!
//! Accounts are named custodial identities whose private keys are generated
//! locally and sealed at rest. Balances are read from the chain; transfers
//! are signed locally and broadcast through the configured RPC endpoint(s).

pub mod accounts;
pub mod bank;
pub mod chain;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod vault;

pub use bank::BankService;
pub use config::schema::BankConfig;
pub use error::{BankError, BankResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
