//! Line Figure
//!
//! Observed month-end cumulative balance with a forecast and its 95% band.

use chrono::NaiveDate;
use serde_json::json;

use super::forecast::{drift_forecast, observed_cumulative};
use super::{ChartPayload, Palette};
use crate::ledger::Ledger;

/// Opacity of the confidence band
const BAND_ALPHA: f64 = 0.12;

fn iso(dates: &[NaiveDate]) -> Vec<String> {
    dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()
}

pub fn line_chart(ledger: &Ledger, horizon: usize, palette: &Palette) -> ChartPayload {
    let observed = observed_cumulative(ledger);
    let mut forecast = drift_forecast(&observed, horizon);

    // Anchor the forecast and its band on the last observation so the lines join
    if let Some((last_date, last_value)) = observed.last() {
        if forecast.dates.first().map(|d| *d > last_date).unwrap_or(false) {
            forecast.dates.insert(0, last_date);
            forecast.mean.insert(0, last_value);
            forecast.lower.insert(0, last_value);
            forecast.upper.insert(0, last_value);
        }
    }

    let forecast_x = iso(&forecast.dates);
    let band_x: Vec<String> = forecast_x
        .iter()
        .chain(forecast_x.iter().rev())
        .cloned()
        .collect();
    let band_y: Vec<f64> = forecast
        .lower
        .iter()
        .chain(forecast.upper.iter().rev())
        .copied()
        .collect();

    let forecast_trace = json!({
        "type": "scatter",
        "x": forecast_x,
        "y": forecast.mean,
        "mode": "lines+markers",
        "name": "Forecast",
        "line": { "color": palette.forecast.rgba(1.0), "dash": "dash" },
    });

    let band_trace = json!({
        "type": "scatter",
        "x": band_x,
        "y": band_y,
        "fill": "toself",
        "fillcolor": palette.forecast.rgba(BAND_ALPHA),
        "line": { "color": palette.forecast.rgba(BAND_ALPHA) },
        "hoverinfo": "skip",
        "showlegend": true,
        "name": "95% CI",
    });

    let observed_trace = json!({
        "type": "scatter",
        "x": iso(&observed.dates),
        "y": observed.values,
        "mode": "lines+markers",
        "name": "Observed",
        "line": { "color": palette.observed.rgba(1.0) },
    });

    let layout = json!({
        "title": { "text": "Cumulative Financial Trend with Forecast" },
        "xaxis": { "title": { "text": "Date" } },
        "yaxis": { "title": { "text": "Cumulative amount" } },
        "legend": {
            "orientation": "h",
            "yanchor": "bottom",
            "y": 1.02,
            "xanchor": "right",
            "x": 1,
        },
    });

    ChartPayload::new(vec![forecast_trace, band_trace, observed_trace], layout)
}
