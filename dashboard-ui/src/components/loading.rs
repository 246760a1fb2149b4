//! Loading Component

use leptos::*;

/// Placeholder drawn over a chart that has not arrived yet
#[component]
pub fn ChartSkeleton() -> impl IntoView {
    view! {
        <div class="absolute inset-0 flex items-center justify-center bg-gray-800 rounded-lg animate-pulse">
            <div class="loading-spinner w-8 h-8" />
        </div>
    }
}
