//! UI components built with Leptos.
//!
//! - [`status`] - Status bar with connection state and the connect button
//! - [`fund_me`] - Contract balance and fund / withdraw controls
//! - [`notice`] - Auto-clearing status messages
//! - [`icons`] - Centralized icon definitions (change theme here)

pub mod fund_me;
pub mod icons;
pub mod notice;
pub mod status;

pub use fund_me::FundMe;
pub use status::Status;
