//! Timers and task spawning used by the session.
//!
//! The session never touches the browser event loop directly; receipt
//! polling sleeps and deferred follow-ups go through [`Runtime`] so the
//! state machine can run under a test executor.

use std::future::Future;

use gloo_timers::future::TimeoutFuture;

use crate::utils::dom;

pub trait Runtime: Clone + 'static {
    /// Complete after `ms` milliseconds.
    fn sleep(&self, ms: u32) -> impl Future<Output = ()> + 'static;

    /// Run `task` in the background on the current thread.
    fn spawn(&self, task: impl Future<Output = ()> + 'static);

    /// Restart the application from scratch.
    fn reload(&self);
}

/// Browser event loop: `setTimeout` timers, `spawn_local`, `location.reload()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserRuntime;

impl Runtime for BrowserRuntime {
    fn sleep(&self, ms: u32) -> impl Future<Output = ()> + 'static {
        TimeoutFuture::new(ms)
    }

    fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn reload(&self) {
        dom::reload();
    }
}
