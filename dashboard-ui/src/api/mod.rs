//! Chart API access

pub mod client;

pub use client::{fetch_chart, get_api_base, ChartKind};
