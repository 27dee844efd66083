//! Formatting utilities for addresses, balances and fiat values.

use alloy_primitives::U256;

use crate::config::eth_address::{FULL_LEN, PREFIX_LEN, SUFFIX_START};
use crate::core::units::wei_to_eth;

/// Format Ethereum address for display (0x1234...5678).
pub fn format_eth_address(address: &str) -> String {
    if address.len() >= FULL_LEN {
        format!("{}...{}", &address[..PREFIX_LEN], &address[SUFFIX_START..])
    } else {
        address.to_string()
    }
}

/// Format a wei balance as ETH with 4 decimals; `"0.00"` when unknown.
pub fn format_eth_balance(balance: Option<U256>) -> String {
    match balance {
        Some(wei) => format!("{:.4}", wei_to_eth(wei)),
        None => "0.00".to_string(),
    }
}

/// Format a USD amount (e.g., "$1234.50").
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}
