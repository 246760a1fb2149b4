//! Chart Renderers
//!
//! The rendering side of the dashboard: a call taking a mount point, the
//! trace data and the layout. [`FileRenderer`] materialises each mount point
//! as a file so the dashboard can be produced without a browser.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::{DashboardError, DashboardResult};

/// Plotly.js bundle referenced by rendered HTML pages
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Draws a chart into a named mount point
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, mount: &str, data: &[Value], layout: &Value) -> DashboardResult<()>;
}

/// File format written by [`FileRenderer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `<mount>.json` holding `{data, layout}`
    #[default]
    Json,
    /// `<mount>.html`, a standalone page drawing the chart with Plotly.js
    Html,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            other => Err(format!("Unknown output format '{}', expected json or html", other)),
        }
    }
}

/// Writes one file per mount point into a directory
pub struct FileRenderer {
    out_dir: PathBuf,
    format: OutputFormat,
}

impl FileRenderer {
    pub fn new(out_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            out_dir: out_dir.into(),
            format,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Path the chart for `mount` is written to
    pub fn path_for(&self, mount: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}.{}", mount, self.format.extension()))
    }
}

/// Standalone page calling `Plotly.newPlot(mount, data, layout)`
pub fn html_page(mount: &str, data: &[Value], layout: &Value) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string(data)?;
    let layout = serde_json::to_string(layout)?;
    // Keep embedded JSON from closing the script element
    let data = data.replace("</", "<\\/");
    let layout = layout.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{mount}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="{mount}"></div>
<script>
Plotly.newPlot("{mount}", {data}, {layout});
</script>
</body>
</html>
"#,
        mount = mount,
        cdn = PLOTLY_CDN,
        data = data,
        layout = layout,
    ))
}

#[async_trait]
impl ChartRenderer for FileRenderer {
    async fn render(&self, mount: &str, data: &[Value], layout: &Value) -> DashboardResult<()> {
        let content = match self.format {
            OutputFormat::Json => {
                let figure = serde_json::json!({ "data": data, "layout": layout });
                serde_json::to_string_pretty(&figure)
            }
            OutputFormat::Html => html_page(mount, data, layout),
        }
        .map_err(|e| DashboardError::render(mount, e))?;

        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|e| DashboardError::render(mount, e))?;

        let path = self.path_for(mount);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| DashboardError::render(mount, e))?;

        tracing::debug!(mount = %mount, path = ?path, "Rendered chart");
        Ok(())
    }
}
