//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, BANK_* env overrides)
//!     → validation.rs (semantic checks)
//!     → BankConfig (validated, immutable)
//!
//! environment
//!     → secrets.rs (master key, key-encryption secret)
//!
//! both shared via Arc with every component constructor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Secrets are read from the environment only, never from the file

pub mod loader;
pub mod schema;
pub mod secrets;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BankConfig, ChainConfig, DatabaseConfig, FaucetConfig, ObservabilityConfig, RateLimitConfig,
    ServerConfig, TransferConfig,
};
pub use secrets::Secrets;
