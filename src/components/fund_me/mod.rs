//! FundMe panel: contract balance, fund form, refresh and withdraw.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::notice::NoticeLine;
use crate::models::{Action, NoticeSlot};
use crate::utils::format::format_usd;

stylance::import_crate_style!(css, "src/components/fund_me/fund_me.module.css");

/// Contract balance with its USD equivalent and the three contract actions.
///
/// Controls stay enabled while disconnected so that the session can answer
/// with "Please connect your wallet first"; they are disabled only while an
/// action is in flight.
#[component]
pub fn FundMe() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");
    let snapshot = ctx.snapshot;
    let amount = ctx.amount;
    let busy = ctx.busy;

    let balance = move || snapshot.with(|s| s.balance_text());
    let usd = move || snapshot.with(|s| s.usd_text());
    let rate = move || {
        snapshot.with(|s| format!("1 ETH = {} ({})", format_usd(s.usd_rate), s.rate_tier.label()))
    };

    let on_fund = move |ev: SubmitEvent| {
        ev.prevent_default();
        ctx.submit(Action::Fund(amount.get_untracked()));
    };

    view! {
        <section class=css::panel>
            <div class=css::balance>
                <span class=css::balanceLabel>"Contract balance"</span>
                <span class=css::eth>{balance}" ETH"</span>
                <span class=css::usd>{usd}</span>
                <span class=css::rate>{rate}</span>
            </div>

            <form class=css::form on:submit=on_fund>
                <input
                    class=css::input
                    type="text"
                    inputmode="decimal"
                    placeholder="Amount in ETH"
                    prop:value=move || amount.get()
                    on:input=move |ev| amount.set(event_target_value(&ev))
                    disabled=move || busy.get()
                />
                <button class=css::primary type="submit" disabled=move || busy.get()>
                    <Icon icon=ic::FUND />
                    "Fund"
                </button>
            </form>
            <NoticeLine target=NoticeSlot::Fund />

            <div class=css::actions>
                <button
                    class=css::secondary
                    disabled=move || busy.get()
                    on:click=move |_| ctx.submit(Action::RefreshBalance)
                >
                    <Icon icon=ic::REFRESH />
                    "Refresh balance"
                </button>
                <button
                    class=css::secondary
                    disabled=move || busy.get()
                    on:click=move |_| ctx.submit(Action::Withdraw)
                >
                    <Icon icon=ic::WITHDRAW />
                    "Withdraw"
                </button>
            </div>
            <NoticeLine target=NoticeSlot::Action />
        </section>
    }
}
