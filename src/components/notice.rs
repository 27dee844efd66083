//! Transient notice line for one [`NoticeSlot`].

use leptos::prelude::*;

use crate::app::AppContext;
use crate::models::{NoticeKind, NoticeSlot};

stylance::import_crate_style!(css, "src/components/notice.module.css");

/// Renders the current notice of `target`, if any.
#[component]
pub fn NoticeLine(target: NoticeSlot) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided at root");
    let notice = ctx.notice(target);

    move || {
        notice.get().map(|n| {
            let class = match n.kind {
                NoticeKind::Processing => css::processing,
                NoticeKind::Success => css::success,
                NoticeKind::Error => css::error,
            };
            view! { <p class=class role="status">{n.text}</p> }
        })
    }
}
