use async_trait::async_trait;
use http::{header, HeaderMap, HeaderValue};
use tracing::debug;

use super::TelemetryEvent;
use crate::{error::AppError, proxy::CLIENT};

/// Collector requests present a generic HTTP client identity instead of the
/// visitor's own agent string.
pub const COLLECTOR_USER_AGENT: &str = "PostmanRuntime/7.32.2";

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, event: &TelemetryEvent) -> Result<(), AppError>;
    fn name(&self) -> &str;
}

/// Posts events as JSON to the external event collector.
pub struct CollectorSink {
    endpoint: String,
}

impl CollectorSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EventSink for CollectorSink {
    async fn send(&self, event: &TelemetryEvent) -> Result<(), AppError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(COLLECTOR_USER_AGENT),
        );

        let response = CLIENT
            .post(&self.endpoint)
            .headers(headers)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        debug!("Event POST status: {}", status);
        if !status.is_success() {
            return Err(AppError::Telemetry(format!("collector returned {}", status)));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "collector"
    }
}
