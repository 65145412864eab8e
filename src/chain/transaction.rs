//! Transaction building and local signing.
//!
//! Everything here is pure: no RPC, no clock. Callers gather nonce, gas and
//! chain id first and hand them in as [`TxParams`].

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{TransactionBuilder, TxSignerSync};
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;

use crate::chain::abi::IERC20;
use crate::error::{BankError, BankResult};
use crate::vault::RawPrivateKey;

/// An ERC-20 movement between two addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferIntent {
    pub from: Address,
    pub to: Address,
    pub token: Address,
    pub amount: U256,
}

/// Chain-derived inputs for a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub nonce: u64,
    pub gas_limit: u64,
    /// Wei per gas unit.
    pub gas_price: u128,
    pub chain_id: u64,
}

/// A signed, EIP-2718 encoded transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hash: TxHash,
    pub raw: Bytes,
}

/// ABI-encoded `transfer(to, amount)` call data.
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Unsigned request used for gas estimation.
pub fn transfer_request(intent: &TransferIntent) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(intent.from)
        .with_to(intent.token)
        .with_input(transfer_calldata(intent.to, intent.amount))
}

/// Unsigned native value transfer, used for gas estimation.
pub fn native_request(from: Address, to: Address, value: U256) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(from)
        .with_to(to)
        .with_value(value)
}

/// Build and sign an ERC-20 `transfer` to the token contract.
pub fn build_and_sign_transfer(
    key: &RawPrivateKey,
    intent: &TransferIntent,
    params: &TxParams,
) -> BankResult<SignedTransaction> {
    let tx = TxLegacy {
        chain_id: Some(params.chain_id),
        nonce: params.nonce,
        gas_price: params.gas_price,
        gas_limit: params.gas_limit,
        to: TxKind::Call(intent.token),
        value: U256::ZERO,
        input: transfer_calldata(intent.to, intent.amount),
    };
    sign(key, intent.from, tx, params)
}

/// Build and sign a plain native-currency transfer.
pub fn build_and_sign_native(
    key: &RawPrivateKey,
    from: Address,
    to: Address,
    value: U256,
    params: &TxParams,
) -> BankResult<SignedTransaction> {
    let tx = TxLegacy {
        chain_id: Some(params.chain_id),
        nonce: params.nonce,
        gas_price: params.gas_price,
        gas_limit: params.gas_limit,
        to: TxKind::Call(to),
        value,
        input: Bytes::new(),
    };
    sign(key, from, tx, params)
}

fn sign(
    key: &RawPrivateKey,
    from: Address,
    mut tx: TxLegacy,
    params: &TxParams,
) -> BankResult<SignedTransaction> {
    if params.gas_limit == 0 {
        return Err(BankError::InvalidTransaction("gas limit is zero".to_string()));
    }
    if params.chain_id == 0 {
        return Err(BankError::InvalidTransaction("chain id is zero".to_string()));
    }

    let signer = key.signer().map_err(BankError::InvalidTransaction)?;
    if signer.address() != from {
        return Err(BankError::InvalidTransaction(format!(
            "signing key does not control {}",
            from
        )));
    }

    let signature = signer
        .sign_transaction_sync(&mut tx)
        .map_err(|e| BankError::InvalidTransaction(e.to_string()))?;
    let signed = tx.into_signed(signature);
    let hash = *signed.hash();
    let raw = TxEnvelope::Legacy(signed).encoded_2718();

    Ok(SignedTransaction {
        hash,
        raw: raw.into(),
    })
}
