//! Receipt polling for broadcast transactions.

use alloy::primitives::TxHash;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::chain::client::ChainClient;
use crate::chain::types::{ChainError, ChainResult, TxOutcome};

/// Polling parameters for [`wait_for_confirmation`].
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationPolicy {
    pub required_confirmations: u32,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

/// Wait until `tx_hash` is mined with enough confirmations.
///
/// A reverted transaction fails with [`ChainError::Reverted`]; running out of
/// time fails with [`ChainError::ConfirmationTimeout`]. Both carry the hash.
/// Lookup failures while polling are retried until the deadline, since the
/// transaction is already out of our hands.
pub async fn wait_for_confirmation(
    chain: &dyn ChainClient,
    tx_hash: TxHash,
    policy: ConfirmationPolicy,
) -> ChainResult<TxOutcome> {
    let result = timeout(policy.timeout, async {
        let mut ticker = interval(policy.poll_interval);

        loop {
            ticker.tick().await;

            let outcome = match chain.get_transaction_receipt(tx_hash).await {
                Ok(Some(outcome)) => outcome,
                Ok(None) => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed");
                    continue;
                }
            };

            if !outcome.success {
                return Err(ChainError::Reverted { tx_hash });
            }

            let current_block = match chain.get_block_number().await {
                Ok(block) => block,
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Block number lookup failed");
                    continue;
                }
            };
            let tx_block = outcome.block_number.unwrap_or(current_block);
            // The inclusion block counts as the first confirmation
            let confirmations = current_block.saturating_sub(tx_block) + 1;

            if confirmations >= policy.required_confirmations as u64 {
                return Ok(outcome);
            }

            tracing::debug!(
                tx_hash = %tx_hash,
                confirmations,
                required = policy.required_confirmations,
                "Waiting for confirmations"
            );
        }
    })
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(_) => Err(ChainError::ConfirmationTimeout {
            tx_hash,
            secs: policy.timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, Bytes, U256};
    use alloy::rpc::types::TransactionRequest;
    use async_trait::async_trait;

    /// Never mines anything; receipt lookups fail every other call.
    struct StuckChain {
        lookups: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl ChainClient for StuckChain {
        async fn get_chain_id(&self) -> ChainResult<u64> {
            unimplemented!()
        }
        async fn get_block_number(&self) -> ChainResult<u64> {
            Ok(1)
        }
        async fn get_token_balance(&self, _: Address, _: Address) -> ChainResult<U256> {
            unimplemented!()
        }
        async fn get_native_balance(&self, _: Address) -> ChainResult<U256> {
            unimplemented!()
        }
        async fn get_nonce(&self, _: Address) -> ChainResult<u64> {
            unimplemented!()
        }
        async fn estimate_gas(&self, _: TransactionRequest) -> ChainResult<u64> {
            unimplemented!()
        }
        async fn get_gas_price(&self) -> ChainResult<u128> {
            unimplemented!()
        }
        async fn broadcast(&self, _: Bytes) -> ChainResult<TxHash> {
            unimplemented!()
        }
        async fn get_transaction_receipt(&self, _: TxHash) -> ChainResult<Option<TxOutcome>> {
            let n = self
                .lookups
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n % 2 == 0 {
                Err(ChainError::Rpc("connection reset".into()))
            } else {
                Ok(None)
            }
        }
    }

    #[tokio::test]
    async fn test_timeout_keeps_tx_hash() {
        let chain = StuckChain {
            lookups: Default::default(),
        };
        let tx_hash = TxHash::repeat_byte(0x11);
        let policy = ConfirmationPolicy {
            required_confirmations: 1,
            timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(10),
        };

        let err = wait_for_confirmation(&chain, tx_hash, policy).await.unwrap_err();
        assert!(matches!(err, ChainError::ConfirmationTimeout { .. }));
        assert_eq!(err.tx_hash(), Some(tx_hash));
        // Lookup errors did not end the wait early
        assert!(chain.lookups.load(std::sync::atomic::Ordering::SeqCst) > 2);
    }
}
