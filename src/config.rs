//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the application.
//! Runtime-tunable session parameters live in [`SessionConfig`], whose
//! defaults are built from these constants.

use alloy_primitives::{Address, address};
use log::LevelFilter;

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name displayed in the page header.
pub const APP_NAME: &str = "Fund Me";

/// Maximum log level forwarded to the browser console.
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

// =============================================================================
// Contract Configuration
// =============================================================================

/// Address of the deployed FundMe contract.
pub const CONTRACT_ADDRESS: Address = address!("0xc9cfc643be5106080c9466efc11a8de39a3db9fa");

/// Decimal places of the native currency (wei per ether = 10^18).
pub const ETH_DECIMALS: usize = 18;

/// Decimal places of the on-chain price feed answer.
pub const PRICE_FEED_DECIMALS: u8 = 8;

/// Confirmations awaited before a transaction counts as settled.
pub const REQUIRED_CONFIRMATIONS: u64 = 1;

/// Interval between transaction receipt polls in milliseconds.
pub const RECEIPT_POLL_INTERVAL_MS: u32 = 1500;

/// Delay before re-reading the balance after a confirmed transaction.
pub const BALANCE_REFRESH_DELAY_MS: u32 = 2000;

// =============================================================================
// Price Configuration
// =============================================================================

/// ETH/USD rate used when neither the price API nor the price feed answers.
pub const FALLBACK_USD_RATE: f64 = 4500.0;

/// External price API returning `{"ethereum":{"usd":<price>}}`.
pub const PRICE_API_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=ethereum&vs_currencies=usd";

// =============================================================================
// Network Configuration
// =============================================================================

/// Fetch request timeout in milliseconds.
pub const FETCH_TIMEOUT_MS: i32 = 10000;

/// Wallet download page shown when no provider is injected.
pub const INSTALL_URL: &str = "https://metamask.io/download.html";

// =============================================================================
// Wallet Configuration
// =============================================================================

/// localStorage keys for wallet session persistence.
pub mod storage {
    /// Set to `"true"` while a wallet is connected.
    pub const WALLET_CONNECTED_KEY: &str = "walletConnected";
    /// Last connected account address.
    pub const CONNECTED_ACCOUNT_KEY: &str = "connectedAccount";
}

/// Ethereum address display constants.
pub mod eth_address {
    /// Characters kept from the start (`0x` + 4 hex digits).
    pub const PREFIX_LEN: usize = 6;
    /// Index where the 4-digit suffix starts.
    pub const SUFFIX_START: usize = 38;
    /// Length of a full `0x`-prefixed address.
    pub const FULL_LEN: usize = 42;
}

// =============================================================================
// Notice Configuration
// =============================================================================

/// How long transient notices stay visible (milliseconds).
pub mod notice_ttl {
    /// Connection errors (rejected request, provider failure).
    pub const CONNECT_ERROR_MS: u32 = 3000;
    /// Validation and fetch errors.
    pub const ERROR_MS: u32 = 3000;
    /// Confirmed fund / withdraw.
    pub const SUCCESS_MS: u32 = 5000;
    /// Successful balance refresh.
    pub const BALANCE_SUCCESS_MS: u32 = 2000;
}

// =============================================================================
// UI Configuration
// =============================================================================

/// Icon theme selection.
///
/// Available themes:
/// - `Bootstrap` - Familiar, slightly bolder (default)
/// - `Lucide` - Minimal, thin strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(dead_code)]
pub enum IconTheme {
    #[default]
    Bootstrap,
    Lucide,
}

/// Current icon theme used throughout the application.
pub const ICON_THEME: IconTheme = IconTheme::Bootstrap;

// =============================================================================
// Session Configuration
// =============================================================================

/// Parameters of a wallet session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Contract every balance, fund and withdraw call targets.
    pub contract: Address,
    /// Confirmations awaited per transaction.
    pub confirmations: u64,
    /// Receipt polling interval.
    pub receipt_poll_ms: u32,
    /// Delay before the post-transaction balance refresh.
    pub balance_refresh_delay_ms: u32,
    /// Last-resort ETH/USD rate.
    pub fallback_usd_rate: f64,
}

impl SessionConfig {
    /// Fallback rate, guaranteed strictly positive.
    pub fn fallback_rate(&self) -> f64 {
        if self.fallback_usd_rate.is_finite() && self.fallback_usd_rate > 0.0 {
            self.fallback_usd_rate
        } else {
            FALLBACK_USD_RATE
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            contract: CONTRACT_ADDRESS,
            confirmations: REQUIRED_CONFIRMATIONS,
            receipt_poll_ms: RECEIPT_POLL_INTERVAL_MS,
            balance_refresh_delay_ms: BALANCE_REFRESH_DELAY_MS,
            fallback_usd_rate: FALLBACK_USD_RATE,
        }
    }
}
