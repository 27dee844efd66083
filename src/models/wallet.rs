use alloy_primitives::{Address, U256};

use crate::core::price::PriceTier;
use crate::core::units::wei_to_eth;
use crate::utils::format::{format_eth_address, format_eth_balance, format_usd};

/// Wallet connection state
///
/// The account is carried by the `Connected` variant, so an account exists
/// exactly when the wallet is connected.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum WalletState {
    #[default]
    Disconnected,
    Connecting,
    Connected {
        address: Address,
        chain_id: Option<u64>,
    },
}

impl WalletState {
    /// Check if wallet is connected
    pub fn is_connected(&self) -> bool {
        matches!(self, WalletState::Connected { .. })
    }

    /// Active account if connected
    pub fn address(&self) -> Option<Address> {
        match self {
            WalletState::Connected { address, .. } => Some(*address),
            _ => None,
        }
    }

    /// Get chain ID if connected
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            WalletState::Connected { chain_id, .. } => *chain_id,
            _ => None,
        }
    }

    /// A pending `Connecting` resolves back to `Disconnected`.
    pub fn settle(self) -> Self {
        match self {
            WalletState::Connecting => WalletState::Disconnected,
            other => other,
        }
    }

    /// Format address for display (0x1234...5678)
    pub fn display_name(&self) -> String {
        match self {
            WalletState::Connected { address, .. } => format_eth_address(&address.to_string()),
            _ => String::new(),
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self {
            WalletState::Disconnected => "Not connected",
            WalletState::Connecting => "Connecting...",
            WalletState::Connected { .. } => "Connected to MetaMask",
        }
    }
}

/// User-triggered session actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Connect,
    /// Fund with the raw amount typed by the user.
    Fund(String),
    Withdraw,
    RefreshBalance,
}

/// Read-only view of the session published to the UI.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub wallet: WalletState,
    /// Whether an injected wallet provider was detected.
    pub provider_available: bool,
    /// Last connected account from persisted storage (display hint).
    pub remembered: Option<Address>,
    /// Contract balance in wei.
    pub balance: Option<U256>,
    pub usd_rate: f64,
    pub rate_tier: PriceTier,
}

impl SessionSnapshot {
    /// USD value of the balance at the cached rate.
    pub fn usd_balance(&self) -> Option<f64> {
        self.balance.map(|wei| wei_to_eth(wei) * self.usd_rate)
    }

    /// ETH balance with 4 decimals, `"0.00"` when unknown.
    pub fn balance_text(&self) -> String {
        format_eth_balance(self.balance)
    }

    pub fn usd_text(&self) -> String {
        format_usd(self.usd_balance().unwrap_or_default())
    }

    pub fn status_text(&self) -> &'static str {
        if self.provider_available {
            self.wallet.status_text()
        } else {
            "MetaMask not installed"
        }
    }
}
