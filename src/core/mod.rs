//! Core business logic for the FundMe dapp.
//!
//! This module provides:
//! - [`Session`] the wallet session state machine and its [`Driver`]
//! - [`provider`] EIP-1193 request helpers and the injected [`wallet`]
//! - [`contract`] FundMe and price feed bindings, [`price`] rate lookup
//! - [`units`] ETH amount parsing and formatting

pub mod contract;
pub mod driver;
pub mod error;
pub mod persist;
pub mod price;
pub mod provider;
pub mod runtime;
pub mod session;
pub mod units;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::{Driver, SessionHandle, Update};
pub use session::Session;
