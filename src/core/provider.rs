//! EIP-1193 provider seam.
//!
//! [`Eip1193`] is the single request/response entry point of a wallet
//! provider. The free functions in this module wrap the handful of JSON-RPC
//! methods the session needs and decode their results into
//! `alloy-primitives` types.

use alloy_primitives::{Address, B256, Bytes, U256, hex};
use serde_json::{Value, json};

use crate::core::error::ProviderError;

/// Request side of an EIP-1193 provider (`provider.request({ method, params })`).
pub trait Eip1193 {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}

/// Push notifications emitted by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// `accountsChanged` with the new account list (possibly empty).
    AccountsChanged(Vec<Address>),
    /// `chainChanged` with the hex chain id.
    ChainChanged(String),
    /// `disconnect`.
    Disconnect,
}

/// Transaction parameters for `eth_sendTransaction`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: Option<U256>,
    pub data: Option<Bytes>,
}

impl TransactionRequest {
    pub fn new(from: Address, to: Address) -> Self {
        Self {
            from,
            to,
            value: None,
            data: None,
        }
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut tx = json!({
            "from": self.from.to_string(),
            "to": self.to.to_string(),
        });
        if let Some(value) = self.value {
            tx["value"] = Value::String(format!("{value:#x}"));
        }
        if let Some(data) = &self.data {
            tx["data"] = Value::String(hex::encode_prefixed(data));
        }
        tx
    }
}

/// Subset of a transaction receipt used for confirmation tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub block_number: Option<u64>,
    /// `Some(false)` when the transaction reverted.
    pub succeeded: Option<bool>,
}

// =============================================================================
// Typed RPC helpers
// =============================================================================

/// Accounts already authorized for this origin (`eth_accounts`, no prompt).
pub async fn accounts<P: Eip1193>(provider: &P) -> Result<Vec<Address>, ProviderError> {
    let result = provider.request("eth_accounts", json!([])).await?;
    Ok(parse_accounts(&result))
}

/// Interactive account access (`eth_requestAccounts`, shows the wallet popup).
pub async fn request_accounts<P: Eip1193>(provider: &P) -> Result<Vec<Address>, ProviderError> {
    let result = provider.request("eth_requestAccounts", json!([])).await?;
    Ok(parse_accounts(&result))
}

/// Current chain id (`eth_chainId`).
pub async fn chain_id<P: Eip1193>(provider: &P) -> Result<u64, ProviderError> {
    let result = provider.request("eth_chainId", json!([])).await?;
    parse_chain_id(&result)
}

/// Balance of `address` at the latest block, in wei.
pub async fn get_balance<P: Eip1193>(provider: &P, address: Address) -> Result<U256, ProviderError> {
    let result = provider
        .request("eth_getBalance", json!([address.to_string(), "latest"]))
        .await?;
    parse_quantity(&result)
}

/// Submit a transaction through the wallet; returns its hash.
pub async fn send_transaction<P: Eip1193>(
    provider: &P,
    tx: &TransactionRequest,
) -> Result<B256, ProviderError> {
    let result = provider
        .request("eth_sendTransaction", json!([tx.to_json()]))
        .await?;
    result
        .as_str()
        .and_then(|s| s.parse::<B256>().ok())
        .ok_or_else(|| ProviderError::other(format!("invalid transaction hash: {result}")))
}

/// Read-only contract call (`eth_call`) at the latest block.
pub async fn call<P: Eip1193>(provider: &P, to: Address, data: &[u8]) -> Result<Bytes, ProviderError> {
    let result = provider
        .request(
            "eth_call",
            json!([{ "to": to.to_string(), "data": hex::encode_prefixed(data) }, "latest"]),
        )
        .await?;
    result
        .as_str()
        .and_then(|s| hex::decode(s).ok())
        .map(Bytes::from)
        .ok_or_else(|| ProviderError::other(format!("invalid call result: {result}")))
}

/// Receipt of a mined transaction, `None` while pending.
pub async fn transaction_receipt<P: Eip1193>(
    provider: &P,
    hash: B256,
) -> Result<Option<Receipt>, ProviderError> {
    let result = provider
        .request("eth_getTransactionReceipt", json!([hash.to_string()]))
        .await?;
    if result.is_null() {
        return Ok(None);
    }

    let block_number = match result.get("blockNumber") {
        Some(v) if !v.is_null() => Some(parse_u64(v)?),
        _ => None,
    };
    let succeeded = match result.get("status") {
        Some(v) if !v.is_null() => Some(!parse_quantity(v)?.is_zero()),
        _ => None,
    };
    Ok(Some(Receipt {
        block_number,
        succeeded,
    }))
}

/// Latest block number (`eth_blockNumber`).
pub async fn block_number<P: Eip1193>(provider: &P) -> Result<u64, ProviderError> {
    let result = provider.request("eth_blockNumber", json!([])).await?;
    parse_u64(&result)
}

// =============================================================================
// Decoding
// =============================================================================

/// Parse an account list, skipping entries that are not addresses.
pub fn parse_accounts(value: &Value) -> Vec<Address> {
    value
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|v| v.as_str())
                .filter_map(|s| s.parse::<Address>().ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a hex chain id such as `"0x1"` or `"0xaa36a7"`.
pub fn parse_chain_id(value: &Value) -> Result<u64, ProviderError> {
    parse_u64(value)
}

/// Parse a hex JSON-RPC quantity (`"0x1bc16d674ec80000"`).
pub fn parse_quantity(value: &Value) -> Result<U256, ProviderError> {
    let s = value
        .as_str()
        .ok_or_else(|| ProviderError::other(format!("expected hex quantity, got {value}")))?;
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| ProviderError::other(format!("quantity without 0x prefix: {s}")))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|_| ProviderError::other(format!("invalid hex quantity: {s}")))
}

fn parse_u64(value: &Value) -> Result<u64, ProviderError> {
    let quantity = parse_quantity(value)?;
    u64::try_from(quantity).map_err(|_| ProviderError::other(format!("quantity out of range: {value}")))
}
