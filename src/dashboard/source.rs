//! Chart Sources
//!
//! Where the dashboard gets its figures from. [`HttpChartSource`] issues a
//! GET against the chart API; tests plug in their own sources.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::error::{DashboardError, DashboardResult};
use crate::charts::{ChartKind, ChartPayload};

/// Something that can produce the payload for a chart
#[async_trait]
pub trait ChartSource: Send + Sync {
    async fn fetch(&self, kind: ChartKind) -> DashboardResult<ChartPayload>;
}

/// Fetches charts from a running chart API
pub struct HttpChartSource {
    client: Client,
    base_url: String,
}

impl HttpChartSource {
    /// Create a source for `base_url` (e.g. "http://localhost:8082")
    pub fn new(base_url: &str, timeout: Duration) -> DashboardResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Network {
                endpoint: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a source sharing an existing client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, kind: ChartKind) -> String {
        format!("{}{}", self.base_url, kind.endpoint())
    }
}

#[async_trait]
impl ChartSource for HttpChartSource {
    async fn fetch(&self, kind: ChartKind) -> DashboardResult<ChartPayload> {
        let endpoint = kind.endpoint().to_string();
        let url = self.url(kind);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                DashboardError::Timeout {
                    endpoint: endpoint.clone(),
                }
            } else {
                DashboardError::Network {
                    endpoint: endpoint.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(DashboardError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| DashboardError::Network {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_slice(&body).map_err(|e| DashboardError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{build_router, ApiConfig, AppState};
    use crate::charts::{build_chart, ChartOptions};
    use crate::ledger::Ledger;
    use axum::{routing::get, Json, Router};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn source(base_url: &str) -> HttpChartSource {
        HttpChartSource::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_building() {
        let src = source("http://localhost:8082/");
        assert_eq!(src.base_url(), "http://localhost:8082");
        assert_eq!(src.url(ChartKind::Sankey), "http://localhost:8082/api/sankey");
    }

    #[tokio::test]
    async fn test_fetch_from_chart_api() {
        let state = AppState::new(Ledger::sample(), ApiConfig::default());
        let base = spawn(build_router(state)).await;
        let src = source(&base);

        for kind in [ChartKind::Sankey, ChartKind::Pie, ChartKind::Bar] {
            let payload = src.fetch(kind).await.unwrap();
            let expected = build_chart(kind, &Ledger::sample(), &ChartOptions::default());
            assert_eq!(payload, expected, "{} differs", kind);
        }

        // Band bounds are not exact after a JSON round trip, compare the shape
        let line = src.fetch(ChartKind::Line).await.unwrap();
        assert_eq!(line.data.len(), 3);
        assert_eq!(line.data[2]["name"], "Observed");
        assert_eq!(line.data[2]["x"][0], "2026-01-31");
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let router = Router::new().route(
            "/api/pie",
            get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn(router).await;

        let err = source(&base).fetch(ChartKind::Pie).await.unwrap_err();
        assert!(matches!(err, DashboardError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_payload() {
        let router = Router::new().route(
            "/api/bar",
            get(|| async { Json(serde_json::json!({ "data": [] })) }),
        );
        let base = spawn(router).await;

        let err = source(&base).fetch(ChartKind::Bar).await.unwrap_err();
        assert!(matches!(err, DashboardError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_backend() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source(&format!("http://{}", addr))
            .fetch(ChartKind::Line)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Network { .. }));
    }
}
