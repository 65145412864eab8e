//! Request and response bodies.

use alloy::primitives::{TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::bank::{Balance, ChainHealth, CreatedAccount, TransferReceipt};

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub name: String,
    pub address: String,
    /// Plaintext key, disclosed once.
    pub private_key: String,
    pub faucet_tx_hash: Option<String>,
}

impl From<CreatedAccount> for CreateAccountResponse {
    fn from(created: CreatedAccount) -> Self {
        Self {
            name: created.account.account.name.clone(),
            address: created.account.account.address.to_string(),
            private_key: created.account.private_key.to_hex(),
            faucet_tx_hash: created.faucet_tx_hash.map(|h| h.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub name: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub name: String,
    pub address: String,
    pub token: String,
    pub token_address: String,
    pub balance: Amount,
}

impl From<Balance> for BalanceResponse {
    fn from(balance: Balance) -> Self {
        Self {
            name: balance.name,
            address: balance.address.to_string(),
            token: balance.token,
            token_address: balance.token_address.to_string(),
            balance: balance.balance.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from_name: String,
    pub to_name: String,
    pub amount: i128,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub success: bool,
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: Amount,
    pub token: String,
}

impl TransferResponse {
    pub fn new(receipt: TransferReceipt, token: String) -> Self {
        Self {
            success: true,
            tx_hash: receipt.tx_hash.to_string(),
            from_address: receipt.from_address.to_string(),
            to_address: receipt.to_address.to_string(),
            amount: receipt.amount.into(),
            token,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FundRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FundResponse {
    pub success: bool,
    pub tx_hash: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub chain: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl From<ChainHealth> for HealthResponse {
    fn from(health: ChainHealth) -> Self {
        if health.reachable {
            Self {
                status: "healthy",
                chain: "connected",
                block_number: health.block_number,
            }
        } else {
            Self {
                status: "degraded",
                chain: "unreachable",
                block_number: None,
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    pub error_code: String,
    /// Set when the transaction was already broadcast before the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>, error_code: &str) -> Self {
        Self {
            detail: detail.into(),
            error_code: error_code.to_string(),
            tx_hash: None,
        }
    }

    pub fn with_tx_hash(mut self, tx_hash: Option<TxHash>) -> Self {
        self.tx_hash = tx_hash.map(|h| h.to_string());
        self
    }
}

/// Token amount rendered as a JSON integer, or a decimal string beyond u128.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Integer(u128),
    Decimal(String),
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        match u128::try_from(value) {
            Ok(v) => Amount::Integer(v),
            Err(_) => Amount::Decimal(value.to_string()),
        }
    }
}
