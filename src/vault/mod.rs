//! Key custody subsystem.
//!
//! # Data Flow
//! ```text
//! account creation:
//!     keys.rs (random keypair) → cipher.rs (seal) → account store
//! transfer:
//!     account store → cipher.rs (unseal) → signer → dropped after signing
//! ```
//!
//! # Security Constraints
//! - The vault key comes only from the environment, loaded once
//! - Plaintext keys never leave process memory except the one-time
//!   disclosure at creation
//! - No I/O in this module

pub mod cipher;
pub mod keys;

pub use cipher::{KeyVault, VaultKey};
pub use keys::{generate_keypair, RawPrivateKey};
