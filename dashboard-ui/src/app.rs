//! App Root Component

use leptos::*;

use crate::api;
use crate::pages::Dashboard;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-gray-900 text-white flex flex-col">
            <header class="bg-gray-800 border-b border-gray-700">
                <div class="container mx-auto px-4 py-4 flex items-center justify-between">
                    <span class="text-xl font-bold">"Finboard"</span>
                    <span class="text-sm text-gray-400">{api::get_api_base()}</span>
                </div>
            </header>

            <main class="flex-1 container mx-auto px-4 py-8">
                <Dashboard />
            </main>
        </div>
    }
}
