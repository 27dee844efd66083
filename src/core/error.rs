//! Custom error types for the application.
//!
//! Provides structured error handling with meaningful error messages
//! and proper error categorization for each domain:
//!
//! - [`WalletError`] - action-level errors of the wallet session
//! - [`ProviderError`] - failures reported by the EIP-1193 provider or a contract call
//! - [`AmountError`] - rejected fund amounts
//! - [`FetchError`] - Network/fetch-related errors for HTTP requests
//! - [`PriceError`] - a single failed tier of the price lookup

use thiserror::Error;

/// Error returned by the injected wallet provider (EIP-1193 `ProviderRpcError`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// EIP-1193 / JSON-RPC error code, when the provider supplied one.
    pub code: Option<i64>,
    /// Human-readable message.
    pub message: String,
}

impl ProviderError {
    /// Code used by wallets when the user declines a request.
    pub const USER_REJECTED: i64 = 4001;

    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Error without a provider code (malformed response, missing field, ...).
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn is_user_rejected(&self) -> bool {
        self.code == Some(Self::USER_REJECTED)
    }
}

/// Reasons a fund amount is refused before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is not a decimal number")]
    Malformed,
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("amount is too large")]
    Overflow,
}

/// Action-level errors of the wallet session.
///
/// Every variant is recoverable except [`WalletError::ProviderMissing`],
/// which ends the session until a wallet is installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// No injected wallet provider detected.
    #[error("MetaMask not installed. Please install MetaMask extension.")]
    ProviderMissing,
    /// The user declined an interactive request.
    #[error("request rejected by user")]
    UserRejected,
    /// Action attempted without a connected account.
    #[error("please connect your wallet first")]
    NotConnected,
    /// Amount failed validation.
    #[error("invalid amount: {0}")]
    Validation(#[from] AmountError),
    /// The provider accepted the account request but returned no account.
    #[error("no account returned from wallet")]
    NoAccount,
    /// Provider RPC or contract call failed.
    #[error("wallet request failed: {0}")]
    NetworkOrContract(String),
    /// Another user action is still in flight.
    #[error("another action is still in progress")]
    Busy,
    /// The session event loop is no longer running.
    #[error("wallet session is not running")]
    SessionClosed,
}

impl From<ProviderError> for WalletError {
    fn from(err: ProviderError) -> Self {
        if err.is_user_rejected() {
            Self::UserRejected
        } else {
            Self::NetworkOrContract(err.message)
        }
    }
}

/// Network/fetch-related errors for HTTP requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Browser window not available
    #[error("Browser window not available")]
    NoWindow,
    /// Failed to create HTTP request
    #[error("Failed to create request")]
    RequestCreationFailed,
    /// Network request failed (timeout, CORS, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// HTTP error response (non-2xx status)
    #[error("HTTP error: {0}")]
    HttpError(u16),
    /// Failed to read response body
    #[error("Failed to read response")]
    ResponseReadFailed,
    /// Invalid response content (not text)
    #[error("Invalid response content")]
    InvalidContent,
    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParseError(String),
    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

/// Failure of one tier of the ETH/USD lookup. Never shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    #[error("price API: {0}")]
    Api(#[from] FetchError),
    #[error("price feed: {0}")]
    Feed(#[from] ProviderError),
    #[error("price is not a positive number: {0}")]
    NotPositive(f64),
}
