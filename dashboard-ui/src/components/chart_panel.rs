//! Chart Panel Component
//!
//! One dashboard tile. The panel fetches its own figure when mounted and
//! draws it as soon as the response arrives, independent of every other
//! panel. Unmounting the panel drops any result still in flight.

use leptos::*;
use std::cell::Cell;
use std::rc::Rc;

use crate::api::{self, ChartKind};
use crate::components::ChartSkeleton;
use crate::plotly;

/// Where a panel is in its load
#[derive(Debug, Clone, PartialEq)]
enum PanelStatus {
    Loading,
    Rendered,
    Failed(String),
}

#[component]
pub fn ChartPanel(kind: ChartKind) -> impl IntoView {
    let status = create_rw_signal(PanelStatus::Loading);
    let cancelled = Rc::new(Cell::new(false));

    let on_unmount = Rc::clone(&cancelled);
    on_cleanup(move || on_unmount.set(true));

    // Runs once, after the mount element exists
    create_effect(move |_| {
        let cancelled = Rc::clone(&cancelled);
        spawn_local(async move {
            let result = match api::fetch_chart(kind).await {
                Ok(payload) if !cancelled.get() => {
                    plotly::new_plot(kind.mount_id(), &payload.data, &payload.layout).await
                }
                Ok(_) => return,
                Err(e) => Err(e),
            };

            if cancelled.get() {
                return;
            }

            match result {
                Ok(()) => status.set(PanelStatus::Rendered),
                Err(e) => {
                    web_sys::console::error_1(
                        &format!("Failed to load {} chart: {}", kind.mount_id(), e).into(),
                    );
                    status.set(PanelStatus::Failed(e));
                }
            }
        });
    });

    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">{kind.title()}</h2>

            <div class="relative min-h-[24rem]">
                <div id={kind.mount_id()} class="w-full" />

                {move || match status.get() {
                    PanelStatus::Loading => view! { <ChartSkeleton /> }.into_view(),
                    PanelStatus::Rendered => view! {}.into_view(),
                    PanelStatus::Failed(message) => view! {
                        <div class="absolute inset-0 flex flex-col items-center justify-center text-center">
                            <span class="text-red-400 font-medium">"Chart unavailable"</span>
                            <span class="text-gray-400 text-sm mt-1">{message}</span>
                        </div>
                    }.into_view(),
                }}
            </div>
        </section>
    }
}
