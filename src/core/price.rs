//! ETH/USD rate lookup.
//!
//! Three tiers, first success wins:
//! 1. the external HTTP price API
//! 2. the on-chain price feed the FundMe contract points at
//! 3. [`FALLBACK_USD_RATE`](crate::config::FALLBACK_USD_RATE)
//!
//! Failures of the first two tiers are logged and never surfaced, so the
//! lookup always ends with a strictly positive rate.

use alloy_primitives::Address;
use serde::Deserialize;

use crate::config::PRICE_API_URL;
use crate::core::contract::{FundMe, PriceFeed};
use crate::core::error::{FetchError, PriceError};
use crate::core::provider::Eip1193;
use crate::utils::fetch_json;

/// Source of the ETH/USD spot price.
pub trait PriceApi {
    async fn usd_price(&self) -> Result<f64, FetchError>;
}

/// Which tier produced the cached rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriceTier {
    Api,
    OnChainFeed,
    #[default]
    Fallback,
}

impl PriceTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Api => "price API",
            Self::OnChainFeed => "on-chain feed",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceQuote {
    pub rate: f64,
    pub tier: PriceTier,
}

/// CoinGecko `simple/price` response.
#[derive(Deserialize)]
struct SimplePriceResponse {
    ethereum: UsdQuote,
}

#[derive(Deserialize)]
struct UsdQuote {
    usd: f64,
}

/// [`PriceApi`] over an HTTP JSON endpoint.
#[derive(Clone, Debug)]
pub struct HttpPriceApi {
    url: String,
}

impl HttpPriceApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for HttpPriceApi {
    fn default() -> Self {
        Self::new(PRICE_API_URL)
    }
}

impl PriceApi for HttpPriceApi {
    async fn usd_price(&self) -> Result<f64, FetchError> {
        let response: SimplePriceResponse = fetch_json(&self.url).await?;
        Ok(response.ethereum.usd)
    }
}

/// Resolve the ETH/USD rate through the three tiers.
///
/// `fallback` must be strictly positive.
pub async fn fetch_usd_rate<A: PriceApi, P: Eip1193>(
    api: &A,
    provider: Option<&P>,
    contract: Address,
    fallback: f64,
) -> PriceQuote {
    match api.usd_price().await.map_err(PriceError::from).and_then(positive) {
        Ok(rate) => {
            log::debug!("ETH/USD {rate} from price API");
            return PriceQuote {
                rate,
                tier: PriceTier::Api,
            };
        }
        Err(e) => log::warn!("{e}"),
    }

    if let Some(provider) = provider {
        match feed_price(provider, contract).await {
            Ok(rate) => {
                log::debug!("ETH/USD {rate} from price feed");
                return PriceQuote {
                    rate,
                    tier: PriceTier::OnChainFeed,
                };
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    log::info!("using fallback ETH/USD rate {fallback}");
    PriceQuote {
        rate: fallback,
        tier: PriceTier::Fallback,
    }
}

async fn feed_price<P: Eip1193>(provider: &P, contract: Address) -> Result<f64, PriceError> {
    let feed = FundMe::new(provider, contract).get_price_feed().await?;
    let answer = PriceFeed::new(provider, feed).latest_answer().await?;
    positive(answer)
}

fn positive(rate: f64) -> Result<f64, PriceError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(PriceError::NotPositive(rate))
    }
}
