//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Read path:
//!     token.rs (symbol or address → contract address)
//!     → client.rs (eth_call / eth_getBalance, failover across providers)
//!
//! Write path:
//!     client.rs (pending nonce, gas estimate, gas price)
//!     → gas.rs (buffer, multiplier, price ceiling)
//!     → transaction.rs (ABI encode, sign locally, EIP-2718 encode)
//!     → client.rs (eth_sendRawTransaction, rejection classification)
//!     → confirmation.rs (optional receipt polling)
//! ```
//!
//! # Design Decisions
//! - Signing never touches the network; the node only sees raw bytes
//! - No retries beyond provider failover; callers decide what to re-run
//! - Every RPC call is bounded by `chain.rpc_timeout_secs`

pub mod abi;
pub mod client;
pub mod confirmation;
pub mod gas;
pub mod token;
pub mod transaction;
pub mod types;

pub use client::{classify_broadcast_error, ChainClient, RpcChainClient};
pub use confirmation::{wait_for_confirmation, ConfirmationPolicy};
pub use token::TokenRef;
pub use transaction::{
    build_and_sign_native, build_and_sign_transfer, SignedTransaction, TransferIntent, TxParams,
};
pub use types::{ChainError, ChainResult, TxOutcome};
