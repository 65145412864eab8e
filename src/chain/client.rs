//! Chain RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint(s)
//! - Query chain state (balances, nonces, gas, receipts)
//! - Broadcast signed transactions
//! - Classify node rejections into typed errors
//!
//! Reads and broadcasts fail over to the next provider on transport errors
//! and timeouts. A node rejection (JSON-RPC error response) is final, except
//! that a node which already holds the exact signed bytes counts as success.

use alloy::network::TransactionBuilder;
use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy::transports::{RpcError, TransportErrorKind, TransportResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::chain::abi::IERC20;
use crate::chain::gas;
use crate::chain::types::{ChainError, ChainResult, TxOutcome};
use crate::config::ChainConfig;
use crate::observability::metrics;

/// Everything the bank needs from a chain.
///
/// Implementations are stateless with respect to accounts; all inputs are
/// passed per call.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Chain id reported by the node.
    async fn get_chain_id(&self) -> ChainResult<u64>;

    /// Latest block number.
    async fn get_block_number(&self) -> ChainResult<u64>;

    /// ERC-20 `balanceOf(owner)` in the token's smallest unit.
    async fn get_token_balance(&self, owner: Address, token: Address) -> ChainResult<U256>;

    /// Native currency balance in wei.
    async fn get_native_balance(&self, owner: Address) -> ChainResult<U256>;

    /// Next nonce for `address`, counting pending transactions.
    async fn get_nonce(&self, address: Address) -> ChainResult<u64>;

    /// Gas limit for `request`, including headroom. Falls back to the
    /// default gas limit when the node cannot estimate.
    async fn estimate_gas(&self, request: TransactionRequest) -> ChainResult<u64>;

    /// Gas price in wei, after applying local price policy.
    async fn get_gas_price(&self) -> ChainResult<u128>;

    /// Submit a signed transaction and return its hash.
    async fn broadcast(&self, raw: Bytes) -> ChainResult<TxHash>;

    /// Receipt outcome, or `None` while the transaction is pending.
    async fn get_transaction_receipt(&self, hash: TxHash) -> ChainResult<Option<TxOutcome>>;
}

type SharedProvider = Arc<dyn Provider + Send + Sync>;

/// Chain client backed by alloy HTTP providers (primary + failovers).
#[derive(Clone)]
pub struct RpcChainClient {
    providers: Vec<SharedProvider>,
    config: ChainConfig,
    timeout_duration: Duration,
}

impl RpcChainClient {
    /// Create a client. No network traffic happens here.
    pub fn new(config: &ChainConfig) -> ChainResult<Self> {
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as SharedProvider);

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => {
                    providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as SharedProvider)
                }
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            chain_id = config.chain_id,
            "Chain client initialized"
        );

        Ok(Self {
            providers,
            config: config.clone(),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
        })
    }

    /// Verify the connected chain id matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let actual = self.get_chain_id().await?;
        if actual != self.config.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: self.config.chain_id,
                actual,
            });
        }
        Ok(())
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Run `call` against each provider in turn.
    ///
    /// Transport failures and timeouts move on to the next provider. A
    /// JSON-RPC error response is mapped through `rejected` and returned.
    async fn with_failover<T, F, Fut>(
        &self,
        op: &'static str,
        rejected: fn(String) -> ChainError,
        call: F,
    ) -> ChainResult<T>
    where
        F: Fn(SharedProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let start = Instant::now();
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => {
                    metrics::record_rpc_call(op, "ok", start);
                    return Ok(result);
                }
                Ok(Err(e)) => {
                    if let Some(payload) = e.as_error_resp() {
                        metrics::record_rpc_call(op, "rejected", start);
                        tracing::debug!(op, provider_idx = i, error = %payload, "Node rejected request");
                        return Err(rejected(payload.message.to_string()));
                    }
                    tracing::warn!(op, provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(op, provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        metrics::record_rpc_call(op, "failed", start);
        Err(ChainError::Rpc(format!("All RPC providers failed to {}", op)))
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_chain_id(&self) -> ChainResult<u64> {
        self.with_failover("get_chain_id", ChainError::Rpc, |p| async move {
            p.get_chain_id().await
        })
        .await
    }

    async fn get_block_number(&self) -> ChainResult<u64> {
        self.with_failover("get_block_number", ChainError::Rpc, |p| async move {
            p.get_block_number().await
        })
        .await
    }

    async fn get_token_balance(&self, owner: Address, token: Address) -> ChainResult<U256> {
        let request = TransactionRequest::default()
            .with_to(token)
            .with_input(IERC20::balanceOfCall { owner }.abi_encode());

        let data = self
            .with_failover("balance_of", ChainError::ContractCall, |p| {
                let request = request.clone();
                async move { p.call(request).await }
            })
            .await?;

        if data.is_empty() {
            return Err(ChainError::ContractCall(format!(
                "no contract code at {}",
                token
            )));
        }
        IERC20::balanceOfCall::abi_decode_returns(&data)
            .map_err(|e| ChainError::ContractCall(format!("undecodable balanceOf result: {}", e)))
    }

    async fn get_native_balance(&self, owner: Address) -> ChainResult<U256> {
        self.with_failover("get_balance", ChainError::Rpc, |p| async move {
            p.get_balance(owner).await
        })
        .await
    }

    async fn get_nonce(&self, address: Address) -> ChainResult<u64> {
        self.with_failover("get_transaction_count", ChainError::Rpc, |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> ChainResult<u64> {
        let estimate = self
            .with_failover("estimate_gas", ChainError::Rpc, |p| {
                let request = request.clone();
                async move { p.estimate_gas(request).await }
            })
            .await;

        let estimate = match estimate {
            Ok(gas) => Some(gas),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    default_gas_limit = self.config.default_gas_limit,
                    "Gas estimation failed, using default gas limit"
                );
                None
            }
        };
        Ok(gas::buffered_gas_limit(estimate, self.config.default_gas_limit))
    }

    async fn get_gas_price(&self) -> ChainResult<u128> {
        if let Some(gwei) = self.config.gas_price_gwei {
            return Ok(gas::fixed_gas_price(gwei));
        }
        let node_price = self
            .with_failover("get_gas_price", ChainError::Rpc, |p| async move {
                p.get_gas_price().await
            })
            .await?;
        gas::adjusted_gas_price(
            node_price,
            self.config.gas_price_multiplier,
            self.config.max_gas_price_gwei,
        )
    }

    async fn broadcast(&self, raw: Bytes) -> ChainResult<TxHash> {
        // A provider that timed out may still have relayed the transaction,
        // so a failover node can answer "already known" for these bytes
        let local_hash = keccak256(&raw);
        self.with_failover("send_raw_transaction", classify_broadcast_error, |p| {
            let raw = raw.clone();
            async move {
                match p.send_raw_transaction(&raw).await {
                    Ok(pending) => Ok(*pending.tx_hash()),
                    Err(e) if is_already_known(&e) => {
                        tracing::info!(tx_hash = %local_hash, "Node already holds transaction");
                        Ok(local_hash)
                    }
                    Err(e) => Err(e),
                }
            }
        })
        .await
    }

    async fn get_transaction_receipt(&self, hash: TxHash) -> ChainResult<Option<TxOutcome>> {
        let receipt = self
            .with_failover("get_transaction_receipt", ChainError::Rpc, |p| async move {
                p.get_transaction_receipt(hash).await
            })
            .await?;

        Ok(receipt.map(|r| TxOutcome {
            success: r.status(),
            block_number: r.block_number,
        }))
    }
}

/// Whether the node rejected a broadcast because it already has the same
/// transaction in its pool.
fn is_already_known(e: &RpcError<TransportErrorKind>) -> bool {
    e.as_error_resp().is_some_and(|payload| {
        let lower = payload.message.to_lowercase();
        lower.contains("already known") || lower.contains("known transaction")
    })
}

/// Map a node's broadcast rejection message to a typed error.
pub fn classify_broadcast_error(message: String) -> ChainError {
    let lower = message.to_lowercase();
    if lower.contains("insufficient funds") {
        ChainError::InsufficientFunds(message)
    } else if lower.contains("nonce too low")
        || lower.contains("replacement transaction underpriced")
    {
        ChainError::NonceTooLow(message)
    } else {
        ChainError::Rpc(message)
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("providers", &self.providers.len())
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::transaction::build_and_sign_native;
    use crate::chain::TxParams;
    use crate::vault::RawPrivateKey;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::net::SocketAddr;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// Serve a JSON-RPC stub that answers every call through `reply`.
    async fn spawn_rpc_stub<F, Fut>(reply: F) -> SocketAddr
    where
        F: Fn(Value) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        let app = Router::new().route(
            "/",
            post(move |Json(request): Json<Value>| {
                let reply = reply.clone();
                async move { Json(reply(request).await) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn test_config() -> ChainConfig {
        ChainConfig {
            // Nothing listens on the discard port
            rpc_url: "http://127.0.0.1:9".to_string(),
            rpc_timeout_secs: 2,
            ..ChainConfig::default()
        }
    }

    #[test]
    fn test_classify_broadcast_error() {
        assert!(matches!(
            classify_broadcast_error("insufficient funds for gas * price + value".into()),
            ChainError::InsufficientFunds(_)
        ));
        assert!(matches!(
            classify_broadcast_error("Nonce too low".into()),
            ChainError::NonceTooLow(_)
        ));
        assert!(matches!(
            classify_broadcast_error("replacement transaction underpriced".into()),
            ChainError::NonceTooLow(_)
        ));
        assert!(matches!(
            classify_broadcast_error("intrinsic gas too low".into()),
            ChainError::Rpc(_)
        ));
    }

    #[test]
    fn test_invalid_primary_url() {
        let config = ChainConfig {
            rpc_url: "not a url".to_string(),
            ..ChainConfig::default()
        };
        assert!(matches!(RpcChainClient::new(&config), Err(ChainError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_rpc_failover_exhausted() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:10".to_string());
        config.failover_urls.push("::bad::".to_string());

        let client = RpcChainClient::new(&config).unwrap();
        assert_eq!(client.providers.len(), 2);

        let err = client.get_chain_id().await.unwrap_err();
        assert!(err.to_string().contains("All RPC providers failed"));
    }

    #[tokio::test]
    async fn test_unreachable_node_estimates_default_gas() {
        let client = RpcChainClient::new(&test_config()).unwrap();
        let gas = client.estimate_gas(TransactionRequest::default()).await.unwrap();
        assert_eq!(gas, client.config().default_gas_limit);
    }

    #[tokio::test]
    async fn test_broadcast_already_known_after_failover() {
        // Primary accepts the request but never answers in time
        let primary = spawn_rpc_stub(|request: Value| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            json!({"jsonrpc": "2.0", "id": request["id"], "result": null})
        })
        .await;
        let backup = spawn_rpc_stub(|request: Value| async move {
            json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": {"code": -32000, "message": "already known"}
            })
        })
        .await;

        let config = ChainConfig {
            rpc_url: format!("http://{}", primary),
            failover_urls: vec![format!("http://{}", backup)],
            rpc_timeout_secs: 1,
            ..ChainConfig::default()
        };
        let client = RpcChainClient::new(&config).unwrap();

        let key = RawPrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let from = key.address().unwrap();
        let params = TxParams {
            nonce: 0,
            gas_limit: 21_000,
            gas_price: 1_000_000_000,
            chain_id: 1,
        };
        let signed =
            build_and_sign_native(&key, from, Address::repeat_byte(7), U256::from(1), &params)
                .unwrap();

        let hash = client.broadcast(signed.raw.clone()).await.unwrap();
        assert_eq!(hash, signed.hash);
    }

    #[tokio::test]
    async fn test_broadcast_rejection_is_not_failed_over() {
        let primary = spawn_rpc_stub(|request: Value| async move {
            json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": {"code": -32000, "message": "nonce too low"}
            })
        })
        .await;
        let config = ChainConfig {
            rpc_url: format!("http://{}", primary),
            // Would fail differently if it were ever tried
            failover_urls: vec!["http://127.0.0.1:9".to_string()],
            rpc_timeout_secs: 2,
            ..ChainConfig::default()
        };
        let client = RpcChainClient::new(&config).unwrap();

        let err = client.broadcast(Bytes::from_static(&[0xf8, 0x00])).await.unwrap_err();
        assert!(matches!(err, ChainError::NonceTooLow(_)));
    }

    #[tokio::test]
    async fn test_fixed_gas_price_skips_node() {
        let config = ChainConfig {
            gas_price_gwei: Some(0.1),
            ..test_config()
        };
        let client = RpcChainClient::new(&config).unwrap();
        assert_eq!(client.get_gas_price().await.unwrap(), 100_000_000);
    }
}
