use std::env;
use dotenv::dotenv;
use regex::bytes::{Regex, RegexBuilder};

use crate::classifier::AgentKind;
use crate::error::AppError;

pub const ORGANIZATION_ID: &str = "87996776-2ccf-4198-bd8a-3aa7c5a6986c";
pub const ALTERNATE_ORIGIN_BASE: &str = "https://salespeak-public-serving.s3.amazonaws.com";
pub const TELEMETRY_ENDPOINT: &str =
    "https://22i9zfydr3.execute-api.us-west-2.amazonaws.com/prod/event_stream";

/// Largest inbound body buffered for replay; larger requests get 413.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Agent detection patterns in reporting priority order.
const AGENT_PATTERNS: [(&str, AgentKind); 8] = [
    (r"ChatGPT-User/1\.0", AgentKind::ChatGptUser),
    (r"GPTBot/1\.0", AgentKind::GptBot),
    (r"Google-Extended", AgentKind::GoogleExtended),
    (r"bingpreview", AgentKind::BingPreview),
    (r"PerplexityBot", AgentKind::PerplexityBot),
    (r"Claude-User", AgentKind::ClaudeUser),
    (r"Claude-Web", AgentKind::ClaudeWeb),
    (r"ClaudeBot", AgentKind::ClaudeBot),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Listener settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    /// Scheme assumed for the live webserver when the request carries no
    /// absolute URI and no `X-Forwarded-Proto`.
    pub default_scheme: String,
    pub log_format: LogFormat,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            default_scheme: env::var("DEFAULT_SCHEME").unwrap_or_else(|_| "https".to_string()),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Compact,
            },
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            default_scheme: "https".to_string(),
            log_format: LogFormat::Compact,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentPattern {
    pub kind: AgentKind,
    pub regex: Regex,
}

impl AgentPattern {
    pub fn new(pattern: &str, kind: AgentKind) -> Result<Self, AppError> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { kind, regex })
    }
}

/// Deployment constants for one organization. Built once and shared
/// read-only between requests.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub organization_id: String,
    pub alternate_origin: String,
    pub telemetry_endpoint: String,
    pub agent_patterns: Vec<AgentPattern>,
}

impl RouterConfig {
    pub fn new() -> Result<Self, AppError> {
        let agent_patterns = AGENT_PATTERNS
            .iter()
            .map(|(pattern, kind)| AgentPattern::new(pattern, *kind))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            organization_id: ORGANIZATION_ID.to_string(),
            alternate_origin: format!("{}/{}", ALTERNATE_ORIGIN_BASE, ORGANIZATION_ID),
            telemetry_endpoint: TELEMETRY_ENDPOINT.to_string(),
            agent_patterns,
        })
    }

    pub fn with_alternate_origin(mut self, origin: impl Into<String>) -> Self {
        self.alternate_origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_telemetry_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.telemetry_endpoint = endpoint.into();
        self
    }
}
