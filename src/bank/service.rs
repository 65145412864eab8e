//! Bank facade consumed by the HTTP layer.

use alloy::primitives::{Address, TxHash, U256};
use std::sync::Arc;
use std::time::Duration;

use crate::accounts::{AccountRegistry, AccountStore, NewAccount};
use crate::bank::faucet::FaucetService;
use crate::bank::transfer::{positive_amount, TransferOrchestrator, TransferReceipt};
use crate::chain::gas::gwei_to_wei;
use crate::chain::{ChainClient, ConfirmationPolicy, TokenRef};
use crate::config::{BankConfig, Secrets};
use crate::error::{BankError, BankResult};
use crate::vault::KeyVault;

/// A freshly created account plus the result of gas seeding.
#[derive(Debug)]
pub struct CreatedAccount {
    pub account: NewAccount,
    /// `None` when seeding is disabled or failed.
    pub faucet_tx_hash: Option<TxHash>,
}

/// A token balance as read from the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub name: String,
    pub address: Address,
    /// Token identifier as supplied by the caller.
    pub token: String,
    pub token_address: Address,
    pub balance: U256,
}

/// Chain reachability snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainHealth {
    pub reachable: bool,
    pub block_number: Option<u64>,
}

/// Entry point for all bank operations.
pub struct BankService {
    config: Arc<BankConfig>,
    registry: AccountRegistry,
    chain: Arc<dyn ChainClient>,
    transfers: Arc<TransferOrchestrator>,
    faucet: FaucetService,
}

impl BankService {
    /// Wire the service from validated configuration and startup secrets.
    pub fn new(
        config: BankConfig,
        secrets: Secrets,
        store: Arc<dyn AccountStore>,
        chain: Arc<dyn ChainClient>,
    ) -> BankResult<Self> {
        let Secrets {
            faucet_key,
            vault_key,
        } = secrets;

        let registry = AccountRegistry::new(store, Arc::new(KeyVault::new(&vault_key)));

        let confirmation = config.transfers.wait_for_receipt.then(|| ConfirmationPolicy {
            required_confirmations: config.chain.confirmation_blocks,
            timeout: Duration::from_secs(config.transfers.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(config.transfers.poll_interval_ms),
        });
        let transfers = Arc::new(
            TransferOrchestrator::new(registry.clone(), chain.clone(), config.chain.chain_id)
                .with_serialized_senders(config.transfers.serialize_per_sender)
                .with_confirmation(confirmation),
        );

        let faucet_token = if config.faucet.token.is_empty() {
            None
        } else {
            Some(TokenRef::parse(&config.faucet.token).resolve(&config.tokens)?)
        };
        let faucet_amount: U256 = config.faucet.amount.parse().map_err(|_| {
            BankError::Configuration(format!("invalid faucet amount '{}'", config.faucet.amount))
        })?;
        let faucet = FaucetService::new(
            registry.clone(),
            transfers.clone(),
            faucet_key,
            faucet_token,
            faucet_amount,
            U256::from(gwei_to_wei(config.faucet.native_seed_gwei)),
        )?;

        Ok(Self {
            config: Arc::new(config),
            registry,
            chain,
            transfers,
            faucet,
        })
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn faucet(&self) -> &FaucetService {
        &self.faucet
    }

    /// Resolve a caller-supplied token identifier to a contract address.
    pub fn resolve_token(&self, token: &str) -> BankResult<Address> {
        TokenRef::parse(token).resolve(&self.config.tokens)
    }

    /// Create an account and seed it with gas money.
    ///
    /// Seeding failures are logged and reported as a missing hash; the
    /// account itself is already durable at that point.
    pub async fn create_account(&self, name: &str) -> BankResult<CreatedAccount> {
        let account = self.registry.create(name).await?;

        let faucet_tx_hash = if self.faucet.seeds_gas() {
            match self.faucet.seed_gas(account.account.address).await {
                Ok(hash) => Some(hash),
                Err(e) => {
                    tracing::error!(name = %name, error = %e, "Gas seeding failed for new account");
                    None
                }
            }
        } else {
            None
        };

        Ok(CreatedAccount {
            account,
            faucet_tx_hash,
        })
    }

    /// Current token balance of a named account.
    pub async fn get_balance(&self, name: &str, token: &str) -> BankResult<Balance> {
        let token_address = self.resolve_token(token)?;
        let account = self.registry.get_by_name(name).await?;
        let balance = self
            .chain
            .get_token_balance(account.address, token_address)
            .await?;

        Ok(Balance {
            name: account.name,
            address: account.address,
            token: token.to_string(),
            token_address,
            balance,
        })
    }

    /// Transfer tokens between two named accounts.
    pub async fn transfer(
        &self,
        from_name: &str,
        to_name: &str,
        token: &str,
        amount: i128,
    ) -> BankResult<TransferReceipt> {
        // Amount first so invalid requests never touch storage or the chain
        positive_amount(amount)?;
        let token_address = self.resolve_token(token)?;
        self.transfers
            .transfer(from_name, to_name, token_address, amount)
            .await
    }

    /// Send the configured faucet amount to a named account.
    pub async fn fund(&self, name: &str) -> BankResult<TxHash> {
        self.faucet.fund(name).await
    }

    pub async fn health(&self) -> ChainHealth {
        match self.chain.get_block_number().await {
            Ok(block) => ChainHealth {
                reachable: true,
                block_number: Some(block),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Chain health check failed");
                ChainHealth {
                    reachable: false,
                    block_number: None,
                }
            }
        }
    }
}
