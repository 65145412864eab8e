//! Transfer orchestration: resolve, check balance, sign, broadcast.

use alloy::primitives::{Address, TxHash, U256};
use std::sync::Arc;

use crate::accounts::AccountRegistry;
use crate::bank::nonce::SenderLocks;
use crate::chain::transaction::{native_request, transfer_request};
use crate::chain::{
    build_and_sign_native, build_and_sign_transfer, wait_for_confirmation, ChainClient,
    ConfirmationPolicy, SignedTransaction, TransferIntent, TxParams,
};
use crate::error::{BankError, BankResult};
use crate::observability::metrics;
use crate::vault::RawPrivateKey;

/// Outcome of a successful account-to-account transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: TxHash,
    pub from_address: Address,
    pub to_address: Address,
    pub token: Address,
    pub amount: U256,
}

/// What the transaction moves.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Payload {
    Token(TransferIntent),
    Native { to: Address, value: U256 },
}

/// Where the signing key comes from.
pub(crate) enum KeySource<'a> {
    /// Ciphertext from the account store; unsealed only for signing.
    Sealed(&'a str),
    /// The master key held for the life of the process.
    Master(&'a RawPrivateKey),
}

/// Builds, signs and broadcasts transfers.
///
/// There is no local retry: a failed step surfaces unchanged and a new call
/// starts over with a fresh nonce.
pub struct TransferOrchestrator {
    registry: AccountRegistry,
    chain: Arc<dyn ChainClient>,
    chain_id: u64,
    locks: SenderLocks,
    serialize_per_sender: bool,
    confirmation: Option<ConfirmationPolicy>,
}

impl TransferOrchestrator {
    pub fn new(registry: AccountRegistry, chain: Arc<dyn ChainClient>, chain_id: u64) -> Self {
        Self {
            registry,
            chain,
            chain_id,
            locks: SenderLocks::new(),
            serialize_per_sender: false,
            confirmation: None,
        }
    }

    /// Hold a per-sender lock from nonce read to broadcast.
    pub fn with_serialized_senders(mut self, enabled: bool) -> Self {
        self.serialize_per_sender = enabled;
        self
    }

    /// Wait for a successful receipt before reporting a transfer.
    pub fn with_confirmation(mut self, policy: Option<ConfirmationPolicy>) -> Self {
        self.confirmation = policy;
        self
    }

    /// Move `amount` of `token` from one named account to another.
    pub async fn transfer(
        &self,
        from_name: &str,
        to_name: &str,
        token: Address,
        amount: i128,
    ) -> BankResult<TransferReceipt> {
        let amount = positive_amount(amount)?;

        let from = self.registry.get_by_name(from_name).await?;
        let to = self.registry.get_by_name(to_name).await?;
        self.ensure_balance(from.address, token, amount).await?;

        let intent = TransferIntent {
            from: from.address,
            to: to.address,
            token,
            amount,
        };
        let tx_hash = self
            .submit(
                "transfer",
                from.address,
                KeySource::Sealed(&from.encrypted_private_key),
                Payload::Token(intent),
                self.serialize_per_sender,
            )
            .await?;

        tracing::info!(
            from = %from_name,
            to = %to_name,
            token = %token,
            amount = %amount,
            tx_hash = %tx_hash,
            "Transfer submitted"
        );

        Ok(TransferReceipt {
            tx_hash,
            from_address: from.address,
            to_address: to.address,
            token,
            amount,
        })
    }

    /// Fail with `InsufficientBalance` when `owner` holds less than `amount`
    /// of `token`. Nothing is signed or broadcast for an overdraft.
    async fn ensure_balance(&self, owner: Address, token: Address, amount: U256) -> BankResult<()> {
        let available = self.chain.get_token_balance(owner, token).await?;
        if available < amount {
            metrics::record_transfer("transfer", "insufficient_balance");
            return Err(BankError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        Ok(())
    }

    /// Nonce → gas → sign → broadcast → optional confirmation.
    pub(crate) async fn submit(
        &self,
        kind: &'static str,
        from: Address,
        key: KeySource<'_>,
        payload: Payload,
        serialize: bool,
    ) -> BankResult<TxHash> {
        let result = self.submit_inner(from, key, payload, serialize).await;
        match &result {
            Ok(_) => metrics::record_transfer(kind, "ok"),
            Err(e) => {
                metrics::record_transfer(kind, e.code());
                tracing::warn!(kind, from = %from, error = %e, "Transaction failed");
            }
        }
        result
    }

    async fn submit_inner(
        &self,
        from: Address,
        key: KeySource<'_>,
        payload: Payload,
        serialize: bool,
    ) -> BankResult<TxHash> {
        let guard = if serialize {
            Some(self.locks.acquire(from).await)
        } else {
            None
        };

        let nonce = self.chain.get_nonce(from).await?;
        let request = match payload {
            Payload::Token(intent) => transfer_request(&intent),
            Payload::Native { to, value } => native_request(from, to, value),
        };
        let gas_limit = self.chain.estimate_gas(request).await?;
        let gas_price = self.chain.get_gas_price().await?;
        let params = TxParams {
            nonce,
            gas_limit,
            gas_price,
            chain_id: self.chain_id,
        };

        let signed = match key {
            KeySource::Sealed(ciphertext) => {
                let private_key = self.registry.vault().decrypt(ciphertext)?;
                sign(&private_key, from, &payload, &params)?
                // private_key dropped here, before any further I/O
            }
            KeySource::Master(private_key) => sign(private_key, from, &payload, &params)?,
        };

        tracing::debug!(
            from = %from,
            nonce,
            gas_limit,
            gas_price,
            tx_hash = %signed.hash,
            "Broadcasting transaction"
        );
        let tx_hash = self.chain.broadcast(signed.raw).await?;
        drop(guard);

        if let Some(policy) = self.confirmation {
            let outcome = wait_for_confirmation(self.chain.as_ref(), tx_hash, policy).await?;
            tracing::debug!(tx_hash = %tx_hash, block = ?outcome.block_number, "Transaction confirmed");
        }

        Ok(tx_hash)
    }
}

fn sign(
    key: &RawPrivateKey,
    from: Address,
    payload: &Payload,
    params: &TxParams,
) -> BankResult<SignedTransaction> {
    match payload {
        Payload::Token(intent) => build_and_sign_transfer(key, intent, params),
        Payload::Native { to, value } => build_and_sign_native(key, from, *to, *value, params),
    }
}

/// Reject zero and negative amounts before any I/O.
pub fn positive_amount(amount: i128) -> BankResult<U256> {
    if amount <= 0 {
        return Err(BankError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(U256::from(amount as u128))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount() {
        assert_eq!(positive_amount(100).unwrap(), U256::from(100));
        assert!(matches!(positive_amount(0), Err(BankError::InvalidAmount(_))));
        assert!(matches!(positive_amount(-5), Err(BankError::InvalidAmount(_))));
        assert_eq!(
            positive_amount(i128::MAX).unwrap(),
            U256::from(i128::MAX as u128)
        );
    }
}
