//! HTTP client for the token-bank API.

pub mod client;

pub use client::{
    Amount, BalanceResponse, BankClient, ClientError, CreateAccountResponse, FundResponse,
    HealthResponse, TransferResponse,
};
