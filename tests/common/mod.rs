//! Shared utilities for integration tests.
//!
//! [`MockChain`] is an in-process chain: it decodes the raw transactions the
//! bank broadcasts, recovers the signer, enforces nonces and gas funds and
//! applies ERC-20 transfers to its own balance table.

#![allow(dead_code)]

use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{address, keccak256, Address, Bytes, TxHash, TxKind, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use token_bank::accounts::MemoryAccountStore;
use token_bank::chain::abi::IERC20;
use token_bank::chain::{ChainClient, ChainError, ChainResult, TxOutcome};
use token_bank::config::{BankConfig, Secrets};
use token_bank::vault::{RawPrivateKey, VaultKey};
use token_bank::BankService;

pub const CHAIN_ID: u64 = 1000;
pub const TOKEN: Address = address!("7a816c115b8aed1fee7029dd490613f20063b9c3");
/// Anvil's first account; used as the master (faucet) key.
pub const MASTER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const MASTER_ADDRESS: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
pub const GAS_PRICE: u128 = 1_000_000_000;
pub const ONE_ETH: u128 = 1_000_000_000_000_000_000;

#[derive(Default)]
struct ChainState {
    native: HashMap<Address, U256>,
    tokens: HashMap<(Address, Address), U256>,
    nonces: HashMap<Address, u64>,
    contracts: HashSet<Address>,
    receipts: HashMap<TxHash, TxOutcome>,
    block: u64,
}

/// In-memory chain implementing [`ChainClient`].
pub struct MockChain {
    chain_id: u64,
    state: Mutex<ChainState>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Mutex::new(ChainState::default()),
            calls: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        }
    }

    pub fn deploy_token(&self, token: Address) {
        self.state.lock().unwrap().contracts.insert(token);
    }

    pub fn mint(&self, token: Address, owner: Address, amount: U256) {
        let mut state = self.state.lock().unwrap();
        *state.tokens.entry((token, owner)).or_default() += amount;
    }

    pub fn set_native(&self, owner: Address, wei: U256) {
        self.state.lock().unwrap().native.insert(owner, wei);
    }

    pub fn token_balance(&self, token: Address, owner: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state.tokens.get(&(token, owner)).copied().unwrap_or_default()
    }

    pub fn native_balance(&self, owner: Address) -> U256 {
        let state = self.state.lock().unwrap();
        state.native.get(&owner).copied().unwrap_or_default()
    }

    pub fn nonce(&self, owner: Address) -> u64 {
        let state = self.state.lock().unwrap();
        state.nonces.get(&owner).copied().unwrap_or_default()
    }

    /// Number of trait calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every call fail as if the node were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn enter(&self) -> ChainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ChainError::Rpc("All RPC providers failed".to_string()));
        }
        Ok(())
    }

    fn apply(&self, raw: &Bytes) -> ChainResult<TxHash> {
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| ChainError::Rpc(format!("rlp: {}", e)))?;
        let TxEnvelope::Legacy(signed) = envelope else {
            return Err(ChainError::Rpc("unsupported transaction type".to_string()));
        };
        let tx = signed.tx();
        let from = signed
            .signature()
            .recover_address_from_prehash(&tx.signature_hash())
            .map_err(|e| ChainError::Rpc(format!("invalid sender: {}", e)))?;

        if tx.chain_id != Some(self.chain_id) {
            return Err(ChainError::Rpc("invalid chain id".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let expected = state.nonces.get(&from).copied().unwrap_or_default();
        if tx.nonce < expected {
            return Err(ChainError::NonceTooLow(format!(
                "nonce too low: next nonce {}, tx nonce {}",
                expected, tx.nonce
            )));
        }
        if tx.nonce > expected {
            return Err(ChainError::Rpc("nonce gap".to_string()));
        }

        let cost = U256::from(tx.gas_limit) * U256::from(tx.gas_price) + tx.value;
        let native = state.native.get(&from).copied().unwrap_or_default();
        if native < cost {
            return Err(ChainError::InsufficientFunds(format!(
                "insufficient funds for gas * price + value: have {} want {}",
                native, cost
            )));
        }

        let TxKind::Call(to) = tx.to else {
            return Err(ChainError::Rpc("contract creation not supported".to_string()));
        };

        state.native.insert(from, native - cost);
        *state.native.entry(to).or_default() += tx.value;
        state.nonces.insert(from, expected + 1);
        state.block += 1;

        let mut success = true;
        if !tx.input.is_empty() {
            success = match IERC20::transferCall::abi_decode(&tx.input) {
                Ok(call) if state.contracts.contains(&to) => {
                    let from_balance = state.tokens.get(&(to, from)).copied().unwrap_or_default();
                    if from_balance >= call.amount {
                        state.tokens.insert((to, from), from_balance - call.amount);
                        *state.tokens.entry((to, call.to)).or_default() += call.amount;
                        true
                    } else {
                        false
                    }
                }
                _ => false,
            };
        }

        let hash = keccak256(raw);
        let block = state.block;
        state.receipts.insert(
            hash,
            TxOutcome {
                success,
                block_number: Some(block),
            },
        );
        Ok(hash)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_chain_id(&self) -> ChainResult<u64> {
        self.enter()?;
        Ok(self.chain_id)
    }

    async fn get_block_number(&self) -> ChainResult<u64> {
        self.enter()?;
        Ok(self.state.lock().unwrap().block)
    }

    async fn get_token_balance(&self, owner: Address, token: Address) -> ChainResult<U256> {
        self.enter()?;
        let state = self.state.lock().unwrap();
        if !state.contracts.contains(&token) {
            return Err(ChainError::ContractCall(format!("no contract code at {}", token)));
        }
        Ok(state.tokens.get(&(token, owner)).copied().unwrap_or_default())
    }

    async fn get_native_balance(&self, owner: Address) -> ChainResult<U256> {
        self.enter()?;
        Ok(self.native_balance(owner))
    }

    async fn get_nonce(&self, address: Address) -> ChainResult<u64> {
        self.enter()?;
        let nonce = self.nonce(address);
        // Let other tasks run between the read and its use, like a real RPC
        tokio::task::yield_now().await;
        Ok(nonce)
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> ChainResult<u64> {
        self.enter()?;
        let has_input = request.input.input().is_some_and(|input| !input.is_empty());
        Ok(if has_input { 60_000 } else { 21_000 })
    }

    async fn get_gas_price(&self) -> ChainResult<u128> {
        self.enter()?;
        Ok(GAS_PRICE)
    }

    async fn broadcast(&self, raw: Bytes) -> ChainResult<TxHash> {
        self.enter()?;
        self.apply(&raw)
    }

    async fn get_transaction_receipt(&self, hash: TxHash) -> ChainResult<Option<TxOutcome>> {
        self.enter()?;
        Ok(self.state.lock().unwrap().receipts.get(&hash).copied())
    }
}

/// Configuration for an ephemeral bank against [`MockChain`].
pub fn test_config() -> BankConfig {
    let mut config = BankConfig::default();
    config.database.path = String::new();
    config.chain.chain_id = CHAIN_ID;
    config
        .tokens
        .insert("USDC".to_string(), TOKEN.to_string());
    config.faucet.token = "USDC".to_string();
    config.faucet.amount = ONE_ETH.to_string();
    // 1 native unit per new account
    config.faucet.native_seed_gwei = 1_000_000_000;
    config.transfers.poll_interval_ms = 10;
    config.transfers.confirmation_timeout_secs = 5;
    config
}

pub fn test_secrets() -> Secrets {
    Secrets {
        faucet_key: RawPrivateKey::from_hex(MASTER_KEY).unwrap(),
        vault_key: VaultKey::generate(),
    }
}

pub struct TestBank {
    pub bank: Arc<BankService>,
    pub chain: Arc<MockChain>,
    pub store: Arc<MemoryAccountStore>,
}

/// Bank wired to a fresh mock chain with a funded master account.
pub fn test_bank(config: BankConfig) -> TestBank {
    let chain = Arc::new(MockChain::new(CHAIN_ID));
    chain.deploy_token(TOKEN);
    chain.set_native(MASTER_ADDRESS, U256::from(1_000 * ONE_ETH));
    chain.mint(TOKEN, MASTER_ADDRESS, U256::from(1_000_000 * ONE_ETH));

    let store = Arc::new(MemoryAccountStore::new());
    let bank = BankService::new(config, test_secrets(), store.clone(), chain.clone()).unwrap();

    TestBank {
        bank: Arc::new(bank),
        chain,
        store,
    }
}

pub fn default_bank() -> TestBank {
    test_bank(test_config())
}
