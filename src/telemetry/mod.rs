pub mod middleware;
pub mod reporter;
pub mod sink;

pub use self::{
    middleware::access_log_middleware,
    reporter::TelemetryReporter,
    sink::{CollectorSink, EventSink},
};

use serde::Serialize;
use uuid::Uuid;

use crate::classifier::AgentKind;

pub const EVENT_TYPE: &str = "chatgpt_user_agent";
pub const LAUNCHER: &str = "proxy";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventData {
    pub launcher: &'static str,
    pub url: String,
    pub bot_type: AgentKind,
}

/// One AI visit, in the collector's wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub data: EventData,
    pub event_type: &'static str,
    pub url: String,
    #[serde(rename = "user_id")]
    pub visitor_id: Uuid,
    pub campaign_id: Uuid,
    pub organization_id: String,
}

impl TelemetryEvent {
    /// A visit with a freshly generated visitor id.
    pub fn new(url: &str, bot_type: AgentKind, organization_id: &str) -> Self {
        Self {
            data: EventData {
                launcher: LAUNCHER,
                url: url.to_string(),
                bot_type,
            },
            event_type: EVENT_TYPE,
            url: url.to_string(),
            visitor_id: Uuid::new_v4(),
            campaign_id: Uuid::nil(),
            organization_id: organization_id.to_string(),
        }
    }
}
