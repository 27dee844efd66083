//! Utility modules for web and DOM operations.
//!
//! Provides:
//! - [`dom`] - window, localStorage and navigation helpers
//! - [`fetch_json`] - Network fetching with timeout
//! - [`format`] - address, balance and USD display formatting
//! - [`logger`] - console backend for the `log` facade

pub mod dom;
mod fetch;
pub mod format;
pub mod logger;

pub use fetch::fetch_json;
