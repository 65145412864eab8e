//! Banking operations.
//!
//! # Data Flow
//! ```text
//! service.rs (token identifier → address, amount check)
//!     → transfer.rs
//!         → accounts (name → address, sealed key)
//!         → nonce.rs (optional per-sender lock)
//!         → chain (nonce, gas, sign, broadcast)
//!     → faucet.rs (same path, master key, always serialized)
//! ```

pub mod faucet;
pub mod nonce;
pub mod service;
pub mod transfer;

pub use faucet::FaucetService;
pub use nonce::{SenderGuard, SenderLocks};
pub use service::{Balance, BankService, ChainHealth, CreatedAccount};
pub use transfer::{positive_amount, TransferOrchestrator, TransferReceipt};
