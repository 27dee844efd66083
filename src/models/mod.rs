//! Data models and types for the application.
//!
//! Contains domain types for:
//! - [`WalletState`], [`SessionSnapshot`] - Web3 wallet connection state
//! - [`Action`] - user-triggered session actions
//! - [`Notice`], [`NoticeSlot`], [`NoticeKind`] - transient status messages

mod notice;
mod wallet;

pub use notice::{Notice, NoticeKind, NoticeSlot, expire};
pub use wallet::{Action, SessionSnapshot, WalletState};
