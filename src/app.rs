//! Root application module.
//!
//! Contains the main App component, the AppContext definition and the
//! start-up wiring between the wallet session and the reactive UI.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::components::{FundMe, Status};
use crate::config::{APP_NAME, SessionConfig};
use crate::core::error::WalletError;
use crate::core::persist::LocalStorageStore;
use crate::core::price::HttpPriceApi;
use crate::core::runtime::BrowserRuntime;
use crate::core::wallet::InjectedProvider;
use crate::core::Update as SessionUpdate;
use crate::core::{Driver, Session, SessionHandle};
use crate::models::{self, Action, Notice, NoticeSlot, SessionSnapshot};

stylance::import_crate_style!(css, "src/app.module.css");

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide reactive context.
///
/// Mirrors the latest [`SessionUpdate`] published by the session driver. This struct
/// is `Copy` because all fields are Leptos signals or stored values.
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Latest session snapshot.
    pub snapshot: RwSignal<SessionSnapshot>,
    /// A user action is in flight; controls are disabled.
    pub busy: RwSignal<bool>,
    /// Contents of the fund amount input.
    pub amount: RwSignal<String>,
    connection_notice: RwSignal<Option<Notice>>,
    fund_notice: RwSignal<Option<Notice>>,
    action_notice: RwSignal<Option<Notice>>,
    handle: StoredValue<Option<SessionHandle>, LocalStorage>,
}

impl AppContext {
    pub fn new() -> Self {
        Self {
            snapshot: RwSignal::new(SessionSnapshot::default()),
            busy: RwSignal::new(false),
            amount: RwSignal::new(String::new()),
            connection_notice: RwSignal::new(None),
            fund_notice: RwSignal::new(None),
            action_notice: RwSignal::new(None),
            handle: StoredValue::new_local(None),
        }
    }

    pub fn notice(&self, slot: NoticeSlot) -> RwSignal<Option<Notice>> {
        match slot {
            NoticeSlot::Connection => self.connection_notice,
            NoticeSlot::Fund => self.fund_notice,
            NoticeSlot::Action => self.action_notice,
        }
    }

    /// Hand a user action to the session driver.
    pub fn submit(&self, action: Action) {
        let result = self.handle.with_value(|handle| match handle {
            Some(handle) => handle.submit(action),
            None => Err(WalletError::SessionClosed),
        });
        if let Err(e) = result {
            log::debug!("action not submitted: {e}");
        }
    }

    /// Stop the session driver.
    pub fn shutdown(&self) {
        self.handle.with_value(|handle| {
            if let Some(handle) = handle {
                handle.shutdown();
            }
        });
    }

    fn apply(&self, update: SessionUpdate) {
        self.snapshot.set(update.snapshot);
        self.busy.set(update.busy);
        if update.reset_amount {
            self.amount.set(String::new());
        }
        if let Some(notice) = update.notice {
            self.show_notice(notice);
        }
    }

    /// Show `notice` in its slot, clearing it after its TTL unless a newer
    /// notice replaced it first.
    fn show_notice(&self, notice: Notice) {
        let slot = self.notice(notice.slot);
        let id = notice.id;
        let ttl_ms = notice.ttl_ms;
        slot.set(Some(notice));

        if let Some(ttl_ms) = ttl_ms {
            spawn_local(async move {
                TimeoutFuture::new(ttl_ms).await;
                slot.update(|current| {
                    models::expire(current, id);
                });
            });
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the wallet, build the session and start its driver.
fn start_session(ctx: AppContext) {
    let provider = match InjectedProvider::detect() {
        Ok(provider) => {
            if !provider.is_metamask() {
                log::info!("injected provider is not MetaMask");
            }
            Some(provider)
        }
        Err(e) => {
            log::warn!("{e}");
            None
        }
    };

    let runtime = BrowserRuntime;
    let session = Session::new(
        provider.clone(),
        HttpPriceApi::default(),
        LocalStorageStore,
        runtime,
        SessionConfig::default(),
    );
    let (handle, driver) = Driver::new(session, runtime, move |update| ctx.apply(update));

    if let Some(provider) = &provider
        && let Err(e) = provider.subscribe(handle.event_sink())
    {
        log::warn!("failed to subscribe to wallet events: {e}");
    }

    ctx.handle.set_value(Some(handle));
    spawn_local(driver.run());
}

/// Root application component.
///
/// Creates and provides the global AppContext, starts the wallet session
/// and renders the status bar above the FundMe panel.
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);
    start_session(ctx);
    on_cleanup(move || ctx.shutdown());

    view! {
        <div class=css::app>
            <Status />
            <main class=css::main>
                <h1 class=css::title>{APP_NAME}</h1>
                <FundMe />
            </main>
        </div>
    }
}
