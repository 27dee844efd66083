//! Status bar component.
//!
//! Displays connection state, the active account and the network, plus the
//! connect (or install) button.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::notice::NoticeLine;
use crate::config::INSTALL_URL;
use crate::core::wallet;
use crate::models::{Action, NoticeSlot, WalletState};
use crate::utils::dom;
use crate::utils::format::format_eth_address;

stylance::import_crate_style!(css, "src/components/status/status.module.css");

/// Status bar displaying session and network information.
///
/// | State | Dot | Button |
/// |-------|-----|--------|
/// | Disconnected | grey | `Connect Wallet` |
/// | Connecting | amber | disabled |
/// | Connected | green | disabled, `Connected` |
/// | No provider | grey | `Install MetaMask` |
#[component]
pub fn Status() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");
    let snapshot = ctx.snapshot;

    let status_text = Signal::derive(move || snapshot.with(|s| s.status_text()));
    let connected = Signal::derive(move || snapshot.with(|s| s.wallet.is_connected()));
    let dot_class = move || {
        snapshot.with(|s| match s.wallet {
            WalletState::Connected { .. } => css::dotOn,
            WalletState::Connecting => css::dotPending,
            WalletState::Disconnected => css::dotOff,
        })
    };

    // Connected account, or the remembered one as a hint until restored
    let account = Signal::derive(move || {
        snapshot.with(|s| {
            s.wallet
                .address()
                .map(|a| (a.to_string(), true))
                .or_else(|| s.remembered.map(|a| (a.to_string(), false)))
        })
    });
    let account_text = move || {
        account
            .get()
            .map(|(a, _)| format_eth_address(&a))
            .unwrap_or_else(|| "-".to_string())
    };
    let account_title = move || account.get().map(|(a, _)| a).unwrap_or_default();
    let account_class = move || match account.get() {
        Some((_, false)) => css::hint,
        _ => css::value,
    };

    let network_name = Signal::derive(move || {
        snapshot.with(|s| {
            s.wallet
                .chain_id()
                .map(|id| wallet::chain_name(id).to_string())
                .unwrap_or_else(|| "-".to_string())
        })
    });

    let provider_available = move || snapshot.with(|s| s.provider_available);

    view! {
        <header class=css::bar>
            <div class=css::section>
                <span class=css::label>
                    <span class=dot_class></span>
                    <span class=css::value>{status_text}</span>
                </span>

                <span class=css::labelCyan title=account_title>
                    <span class=css::labelIcon><Icon icon=ic::USER /></span>
                    <span class=account_class>{account_text}</span>
                </span>

                <span class=css::labelPurple>
                    <span class=css::labelIcon><Icon icon=ic::NETWORK /></span>
                    <span class=css::value>{network_name}</span>
                </span>
            </div>

            <div class=css::actions>
                <Show
                    when=provider_available
                    fallback=|| view! {
                        <button
                            class=css::button
                            on:click=move |_| dom::open_in_new_tab(INSTALL_URL)
                        >
                            <Icon icon=ic::DOWNLOAD />
                            "Install MetaMask"
                            <Icon icon=ic::EXTERNAL_LINK />
                        </button>
                    }
                >
                    <button
                        class=css::button
                        disabled=move || connected.get() || ctx.busy.get()
                        on:click=move |_| ctx.submit(Action::Connect)
                    >
                        <Icon icon=ic::WALLET />
                        {move || if connected.get() { "Connected" } else { "Connect Wallet" }}
                    </button>
                </Show>
                <NoticeLine target=NoticeSlot::Connection />
            </div>
        </header>
    }
}
