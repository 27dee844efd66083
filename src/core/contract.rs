//! Contract bindings over an EIP-1193 provider.
//!
//! - [`FundMe`] - `fund()`, `withdraw()`, `getPriceFeed()` and the contract balance
//! - [`PriceFeed`] - Chainlink-style `latestRoundData()` reader
//! - [`PendingTx`] - a submitted transaction awaiting confirmations

use alloy_primitives::utils::format_units;
use alloy_primitives::{Address, B256, I256, U256};
use alloy_sol_types::{SolCall, sol};

use crate::config::PRICE_FEED_DECIMALS;
use crate::core::error::ProviderError;
use crate::core::provider::{self, Eip1193, Receipt, TransactionRequest};
use crate::core::runtime::Runtime;

sol! {
    interface IFundMe {
        function fund() external payable;
        function withdraw() external;
        function getPriceFeed() external view returns (address);
    }

    interface AggregatorV3Interface {
        function latestRoundData()
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );
    }
}

fn decode_error(function: &str, err: alloy_sol_types::Error) -> ProviderError {
    ProviderError::other(format!("failed to decode {function} return value: {err}"))
}

// =============================================================================
// FundMe
// =============================================================================

/// Binding to the FundMe contract at a fixed address.
pub struct FundMe<'a, P> {
    provider: &'a P,
    address: Address,
}

impl<'a, P: Eip1193> FundMe<'a, P> {
    pub fn new(provider: &'a P, address: Address) -> Self {
        Self { provider, address }
    }

    /// Native balance held by the contract, in wei.
    pub async fn balance(&self) -> Result<U256, ProviderError> {
        provider::get_balance(self.provider, self.address).await
    }

    /// Call `fund()` from `from` with `value` wei attached.
    pub async fn fund(&self, from: Address, value: U256) -> Result<PendingTx<'a, P>, ProviderError> {
        let tx = TransactionRequest::new(from, self.address)
            .value(value)
            .data(IFundMe::fundCall {}.abi_encode());
        self.send(&tx).await
    }

    /// Call `withdraw()` from `from`.
    pub async fn withdraw(&self, from: Address) -> Result<PendingTx<'a, P>, ProviderError> {
        let tx = TransactionRequest::new(from, self.address).data(IFundMe::withdrawCall {}.abi_encode());
        self.send(&tx).await
    }

    /// Address of the price feed the contract was deployed with.
    pub async fn get_price_feed(&self) -> Result<Address, ProviderError> {
        let output = provider::call(
            self.provider,
            self.address,
            &IFundMe::getPriceFeedCall {}.abi_encode(),
        )
        .await?;
        IFundMe::getPriceFeedCall::abi_decode_returns(&output)
            .map_err(|e| decode_error(IFundMe::getPriceFeedCall::SIGNATURE, e))
    }

    async fn send(&self, tx: &TransactionRequest) -> Result<PendingTx<'a, P>, ProviderError> {
        let hash = provider::send_transaction(self.provider, tx).await?;
        Ok(PendingTx {
            provider: self.provider,
            hash,
        })
    }
}

// =============================================================================
// PriceFeed
// =============================================================================

/// Aggregator exposing `latestRoundData()`.
pub struct PriceFeed<'a, P> {
    provider: &'a P,
    address: Address,
}

impl<'a, P: Eip1193> PriceFeed<'a, P> {
    pub fn new(provider: &'a P, address: Address) -> Self {
        Self { provider, address }
    }

    /// Latest answer as a decimal price.
    pub async fn latest_answer(&self) -> Result<f64, ProviderError> {
        let output = provider::call(
            self.provider,
            self.address,
            &AggregatorV3Interface::latestRoundDataCall {}.abi_encode(),
        )
        .await?;
        let round = AggregatorV3Interface::latestRoundDataCall::abi_decode_returns(&output)
            .map_err(|e| decode_error(AggregatorV3Interface::latestRoundDataCall::SIGNATURE, e))?;
        answer_to_price(round.answer)
    }
}

/// Scale a signed 8-decimal feed answer to a price. Only positive answers
/// are accepted.
fn answer_to_price(answer: I256) -> Result<f64, ProviderError> {
    if answer <= I256::ZERO {
        return Err(ProviderError::other(format!("non-positive price answer: {answer}")));
    }

    format_units(answer, PRICE_FEED_DECIMALS)
        .ok()
        .and_then(|price| price.parse().ok())
        .ok_or_else(|| ProviderError::other(format!("price answer out of range: {answer}")))
}

// =============================================================================
// PendingTx
// =============================================================================

/// A submitted transaction.
pub struct PendingTx<'a, P> {
    provider: &'a P,
    hash: B256,
}

impl<P: Eip1193> PendingTx<'_, P> {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Poll for the receipt until it is `confirmations` blocks deep.
    ///
    /// There is no timeout; a provider error ends the wait. A reverted
    /// receipt is an error.
    pub async fn wait<R: Runtime>(
        &self,
        confirmations: u64,
        poll_ms: u32,
        runtime: &R,
    ) -> Result<Receipt, ProviderError> {
        loop {
            if let Some(receipt) = provider::transaction_receipt(self.provider, self.hash).await? {
                if receipt.succeeded == Some(false) {
                    return Err(ProviderError::other(format!(
                        "transaction {} reverted",
                        self.hash
                    )));
                }
                if let Some(mined_at) = receipt.block_number {
                    if confirmations <= 1 {
                        return Ok(receipt);
                    }
                    let head = provider::block_number(self.provider).await?;
                    if head.saturating_sub(mined_at) + 1 >= confirmations {
                        return Ok(receipt);
                    }
                }
            }
            runtime.sleep(poll_ms).await;
        }
    }
}
