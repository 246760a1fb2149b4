//! Dashboard Figures
//!
//! Builds Plotly figure JSON (`{data, layout}`) from a [`Ledger`]. Trace and
//! layout objects are plain `serde_json` values: their shape belongs to the
//! plotting library, this module only fills them in.
//!
//! | Kind   | Endpoint      | Mount point | Builder          |
//! |--------|---------------|-------------|------------------|
//! | Sankey | `/api/sankey` | `sankey`    | [`sankey_chart`] |
//! | Pie    | `/api/pie`    | `pie`       | [`pie_chart`]    |
//! | Bar    | `/api/bar`    | `bar`       | [`bar_chart`]    |
//! | Line   | `/api/line`   | `line`      | [`line_chart`]   |

pub mod bar;
pub mod forecast;
pub mod line;
pub mod palette;
pub mod pie;
pub mod sankey;

pub use bar::bar_chart;
pub use forecast::{drift_forecast, month_end, observed_cumulative, Forecast, MonthlySeries};
pub use line::line_chart;
pub use palette::{Palette, Rgb};
pub use pie::pie_chart;
pub use sankey::sankey_chart;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::ledger::Ledger;

/// The four dashboard charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Sankey,
    Pie,
    Bar,
    Line,
}

impl ChartKind {
    /// All charts, in the order the dashboard requests them
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Sankey,
        ChartKind::Pie,
        ChartKind::Bar,
        ChartKind::Line,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Sankey => "sankey",
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        }
    }

    /// Path of the backend endpoint serving this chart
    pub fn endpoint(&self) -> &'static str {
        match self {
            ChartKind::Sankey => "/api/sankey",
            ChartKind::Pie => "/api/pie",
            ChartKind::Bar => "/api/bar",
            ChartKind::Line => "/api/line",
        }
    }

    /// Identifier of the UI region the chart is drawn into
    pub fn mount_id(&self) -> &'static str {
        self.name()
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown chart '{}', expected sankey, pie, bar or line", s))
    }
}

/// A Plotly figure as exchanged between the chart API and the dashboard
///
/// `data` is the list of trace descriptors, `layout` the rendering
/// configuration. Both are passed through to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl ChartPayload {
    pub fn new(data: Vec<Value>, layout: Value) -> Self {
        Self { data, layout }
    }
}

/// Tunables for figure building
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    /// Number of month-ends forecast on the line chart
    pub forecast_horizon: usize,
    pub palette: Palette,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            forecast_horizon: 3,
            palette: Palette::default(),
        }
    }
}

/// Build the figure for `kind`
pub fn build_chart(kind: ChartKind, ledger: &Ledger, options: &ChartOptions) -> ChartPayload {
    match kind {
        ChartKind::Sankey => sankey_chart(ledger),
        ChartKind::Pie => pie_chart(ledger),
        ChartKind::Bar => bar_chart(ledger, &options.palette),
        ChartKind::Line => line_chart(ledger, options.forecast_horizon, &options.palette),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_endpoints_match_mount_points() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.endpoint(), format!("/api/{}", kind.mount_id()));
        }
        assert_eq!(ChartKind::Sankey.mount_id(), "sankey");
        assert_eq!(ChartKind::Line.endpoint(), "/api/line");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("PIE".parse::<ChartKind>(), Ok(ChartKind::Pie));
        assert_eq!(" bar ".parse::<ChartKind>(), Ok(ChartKind::Bar));
        assert!("scatter".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_payload_requires_data_and_layout() {
        let ok: Result<ChartPayload, _> =
            serde_json::from_str(r#"{"data":[{"values":[1,2,3]}],"layout":{"title":"Pie"}}"#);
        assert!(ok.is_ok());

        let missing: Result<ChartPayload, _> = serde_json::from_str(r#"{"data":[]}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_build_every_chart_from_sample() {
        let ledger = Ledger::sample();
        let options = ChartOptions::default();
        for kind in ChartKind::ALL {
            let payload = build_chart(kind, &ledger, &options);
            assert!(!payload.data.is_empty(), "{} has no traces", kind);
            assert!(payload.layout.is_object());
        }
    }
}
