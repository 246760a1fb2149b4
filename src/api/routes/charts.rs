//! Chart Routes
//!
//! - GET /api/sankey - Income to spending flow
//! - GET /api/pie - Expense distribution
//! - GET /api/bar - Monthly net amount
//! - GET /api/line?horizon=N - Cumulative balance with forecast
//!
//! Every endpoint answers with a Plotly figure `{data, layout}`.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::LineChartParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::charts::{build_chart, line_chart, ChartKind, ChartPayload};

fn figure(state: &AppState, kind: ChartKind) -> Json<ChartPayload> {
    let payload = build_chart(kind, &state.ledger, &state.chart_options);
    tracing::debug!(chart = %kind, traces = payload.data.len(), "Built chart");
    Json(payload)
}

/// GET /api/sankey
pub async fn sankey(State(state): State<Arc<AppState>>) -> Json<ChartPayload> {
    figure(&state, ChartKind::Sankey)
}

/// GET /api/pie
pub async fn pie(State(state): State<Arc<AppState>>) -> Json<ChartPayload> {
    figure(&state, ChartKind::Pie)
}

/// GET /api/bar
pub async fn bar(State(state): State<Arc<AppState>>) -> Json<ChartPayload> {
    figure(&state, ChartKind::Bar)
}

/// GET /api/line
///
/// `horizon` overrides the configured number of forecast month-ends.
pub async fn line(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LineChartParams>, QueryRejection>,
) -> ApiResult<Json<ChartPayload>> {
    let Query(params) = params.map_err(|e| {
        ApiError::Validation(format!("Invalid line chart query: {}", e.body_text()))
    })?;

    let Some(horizon) = params.horizon else {
        return Ok(figure(&state, ChartKind::Line));
    };

    let max = state.config.max_forecast_horizon;
    if horizon == 0 || horizon > max {
        return Err(ApiError::Validation(format!(
            "horizon must be between 1 and {}, got {}",
            max, horizon
        )));
    }

    Ok(Json(line_chart(
        &state.ledger,
        horizon,
        &state.chart_options.palette,
    )))
}

/// Fallback for unknown paths
pub async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
