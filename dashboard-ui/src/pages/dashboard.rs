//! Dashboard Page
//!
//! The four finance charts. Every panel loads on its own, so a slow or
//! failing endpoint never holds back the others.

use leptos::*;

use crate::api::ChartKind;
use crate::components::ChartPanel;

/// Dashboard page component
#[component]
pub fn Dashboard() -> impl IntoView {
    view! {
        <div class="space-y-8">
            // Page header
            <div>
                <h1 class="text-3xl font-bold">"Dashboard"</h1>
                <p class="text-gray-400 mt-1">"Where your money comes from and where it goes"</p>
            </div>

            <div class="grid lg:grid-cols-2 gap-8">
                {ChartKind::ALL
                    .into_iter()
                    .map(|kind| view! { <ChartPanel kind=kind /> })
                    .collect_view()}
            </div>
        </div>
    }
}
