//! Outbound funding from the master account.

use alloy::primitives::{Address, TxHash, U256};
use std::sync::Arc;

use crate::accounts::AccountRegistry;
use crate::bank::transfer::{KeySource, Payload, TransferOrchestrator};
use crate::chain::TransferIntent;
use crate::error::{BankError, BankResult};
use crate::vault::RawPrivateKey;

/// Sends tokens and gas money from the master account.
///
/// Master sends are always serialized on the master address, since every
/// account creation and funding request draws from the same nonce sequence.
pub struct FaucetService {
    registry: AccountRegistry,
    orchestrator: Arc<TransferOrchestrator>,
    master_key: Arc<RawPrivateKey>,
    master_address: Address,
    token: Option<Address>,
    amount: U256,
    native_seed: U256,
}

impl FaucetService {
    pub fn new(
        registry: AccountRegistry,
        orchestrator: Arc<TransferOrchestrator>,
        master_key: RawPrivateKey,
        token: Option<Address>,
        amount: U256,
        native_seed: U256,
    ) -> BankResult<Self> {
        let master_address = master_key
            .address()
            .map_err(|e| BankError::Configuration(format!("faucet key: {}", e)))?;

        tracing::info!(
            master_address = %master_address,
            token = ?token,
            amount = %amount,
            native_seed_wei = %native_seed,
            "Faucet initialized"
        );

        Ok(Self {
            registry,
            orchestrator,
            master_key: Arc::new(master_key),
            master_address,
            token,
            amount,
            native_seed,
        })
    }

    pub fn master_address(&self) -> Address {
        self.master_address
    }

    /// Whether new accounts receive native currency for gas.
    pub fn seeds_gas(&self) -> bool {
        !self.native_seed.is_zero()
    }

    /// Send the configured token amount to a named account.
    pub async fn fund(&self, account_name: &str) -> BankResult<TxHash> {
        let token = self.token.ok_or_else(|| {
            BankError::Configuration("no faucet token configured".to_string())
        })?;
        let account = self.registry.get_by_name(account_name).await?;

        let intent = TransferIntent {
            from: self.master_address,
            to: account.address,
            token,
            amount: self.amount,
        };
        let tx_hash = self
            .orchestrator
            .submit(
                "fund",
                self.master_address,
                KeySource::Master(&self.master_key),
                Payload::Token(intent),
                true,
            )
            .await?;

        tracing::info!(name = %account_name, amount = %self.amount, tx_hash = %tx_hash, "Account funded");
        Ok(tx_hash)
    }

    /// Send the configured native amount to `address`.
    pub async fn seed_gas(&self, address: Address) -> BankResult<TxHash> {
        let tx_hash = self
            .orchestrator
            .submit(
                "seed_gas",
                self.master_address,
                KeySource::Master(&self.master_key),
                Payload::Native {
                    to: address,
                    value: self.native_seed,
                },
                true,
            )
            .await?;

        tracing::info!(address = %address, value_wei = %self.native_seed, tx_hash = %tx_hash, "Gas seeded");
        Ok(tx_hash)
    }
}
