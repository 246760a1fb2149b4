//! Finboard Dashboard
//!
//! Personal financial dashboard built with Leptos (WASM).
//!
//! # Features
//!
//! - Income to spending flow (sankey)
//! - Expense distribution (pie)
//! - Monthly net amount (bar)
//! - Cumulative balance with forecast (line)
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. Each chart panel fetches its figure from the Finboard API on
//! its own and draws it with Plotly.js, loaded by `index.html`.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod plotly;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
