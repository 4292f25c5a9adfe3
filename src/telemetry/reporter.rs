use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{EventSink, TelemetryEvent};
use crate::classifier::Classification;

/// Fire-and-forget reporting of AI visits.
#[derive(Clone)]
pub struct TelemetryReporter {
    sink: Arc<dyn EventSink>,
    organization_id: String,
}

impl TelemetryReporter {
    pub fn new(sink: Arc<dyn EventSink>, organization_id: impl Into<String>) -> Self {
        Self {
            sink,
            organization_id: organization_id.into(),
        }
    }

    /// Spawns one detached delivery attempt for an AI visit and returns
    /// immediately. Browsers produce no event. Failures are logged inside
    /// the task and never retried.
    ///
    /// Returns the spawned task's handle, or `None` for browsers. Dropping
    /// the handle leaves the task running.
    pub fn report(&self, classification: &Classification, url: &str) -> Option<JoinHandle<()>> {
        if !classification.is_ai_visitor {
            return None;
        }

        let event = TelemetryEvent::new(url, classification.agent_kind, &self.organization_id);
        let sink = self.sink.clone();

        Some(tokio::spawn(async move {
            match sink.send(&event).await {
                Ok(()) => info!(
                    sink = sink.name(),
                    bot_type = %event.data.bot_type,
                    visitor_id = %event.visitor_id,
                    "Visit event delivered"
                ),
                Err(e) => error!(
                    sink = sink.name(),
                    bot_type = %event.data.bot_type,
                    "Failed to POST visit event: {}",
                    e
                ),
            }
        }))
    }
}
