//! Transient status messages shown next to the controls.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Where a notice is displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeSlot {
    /// Next to the connect button.
    Connection,
    /// Under the fund form.
    Fund,
    /// Under the balance / withdraw buttons.
    Action,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Processing,
    Success,
    Error,
}

/// A status message with an optional time-to-live.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    /// Unique ID, so a stale auto-clear timer never removes a newer notice
    pub id: usize,
    pub slot: NoticeSlot,
    pub kind: NoticeKind,
    pub text: String,
    /// `None` keeps the notice until replaced.
    pub ttl_ms: Option<u32>,
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

impl Notice {
    fn new(slot: NoticeSlot, kind: NoticeKind, text: impl Into<String>, ttl_ms: Option<u32>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            slot,
            kind,
            text: text.into(),
            ttl_ms,
        }
    }

    pub fn processing(slot: NoticeSlot, text: impl Into<String>) -> Self {
        Self::new(slot, NoticeKind::Processing, text, None)
    }

    pub fn success(slot: NoticeSlot, text: impl Into<String>, ttl_ms: u32) -> Self {
        Self::new(slot, NoticeKind::Success, text, Some(ttl_ms))
    }

    pub fn error(slot: NoticeSlot, text: impl Into<String>, ttl_ms: u32) -> Self {
        Self::new(slot, NoticeKind::Error, text, Some(ttl_ms))
    }

    /// Error that stays until replaced.
    pub fn persistent_error(slot: NoticeSlot, text: impl Into<String>) -> Self {
        Self::new(slot, NoticeKind::Error, text, None)
    }
}

/// Clear `current` once the notice `id` expires.
///
/// A newer notice in the same slot is left alone. Returns whether it cleared.
pub fn expire(current: &mut Option<Notice>, id: usize) -> bool {
    if current.as_ref().is_some_and(|n| n.id == id) {
        *current = None;
        true
    } else {
        false
    }
}
