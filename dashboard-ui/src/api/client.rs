//! HTTP API Client
//!
//! Fetches figures from the Finboard chart API.

use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::Value;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8082";

/// Local storage key overriding the API base URL
const API_URL_KEY: &str = "finboard_api_url";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(API_URL_KEY).ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

/// The four dashboard charts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Sankey,
    Pie,
    Bar,
    Line,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Sankey,
        ChartKind::Pie,
        ChartKind::Bar,
        ChartKind::Line,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            ChartKind::Sankey => "/api/sankey",
            ChartKind::Pie => "/api/pie",
            ChartKind::Bar => "/api/bar",
            ChartKind::Line => "/api/line",
        }
    }

    /// Id of the element the chart is drawn into
    pub fn mount_id(&self) -> &'static str {
        match self {
            ChartKind::Sankey => "sankey",
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Sankey => "Money Flow",
            ChartKind::Pie => "Expenses",
            ChartKind::Bar => "Monthly Net",
            ChartKind::Line => "Trend & Forecast",
        }
    }
}

/// A Plotly figure as served by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ChartPayload {
    pub data: Vec<Value>,
    pub layout: Value,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Fetch one chart's figure
pub async fn fetch_chart(kind: ChartKind) -> Result<ChartPayload, String> {
    let url = format!("{}{}", get_api_base(), kind.endpoint());

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        let status = response.status();
        let message = response
            .json::<ApiErrorBody>()
            .await
            .map(|body| body.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        return Err(message);
    }

    response
        .json()
        .await
        .map_err(|e| format!("Parse error: {}", e))
}
