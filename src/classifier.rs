//! User-agent classification.
//!
//! Every request is sorted into AI visitor or regular browser from its
//! `User-Agent` header and the `user-agent=chatgpt` query override.
//! Classification never fails; anything unrecognised is a regular browser.

use axum::http::{header::USER_AGENT, HeaderMap};
use serde::Serialize;
use std::fmt;
use url::Url;

use crate::config::AgentPattern;

/// Query parameter that forces ChatGPT classification.
pub const OVERRIDE_PARAM: &str = "user-agent";
const OVERRIDE_CHATGPT: &str = "chatgpt";

/// Detected agent family. Variants are declared in reporting priority
/// order, so the derived `Ord` picks the winner when several match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgentKind {
    #[serde(rename = "ChatGPT-User")]
    ChatGptUser,
    #[serde(rename = "GPTBot")]
    GptBot,
    #[serde(rename = "Google-Extended")]
    GoogleExtended,
    #[serde(rename = "BingPreview")]
    BingPreview,
    #[serde(rename = "PerplexityBot")]
    PerplexityBot,
    #[serde(rename = "Claude-User")]
    ClaudeUser,
    #[serde(rename = "Claude-Web")]
    ClaudeWeb,
    #[serde(rename = "ClaudeBot")]
    ClaudeBot,
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "None")]
    None,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::ChatGptUser => "ChatGPT-User",
            AgentKind::GptBot => "GPTBot",
            AgentKind::GoogleExtended => "Google-Extended",
            AgentKind::BingPreview => "BingPreview",
            AgentKind::PerplexityBot => "PerplexityBot",
            AgentKind::ClaudeUser => "Claude-User",
            AgentKind::ClaudeWeb => "Claude-Web",
            AgentKind::ClaudeBot => "ClaudeBot",
            AgentKind::Unknown => "Unknown",
            AgentKind::None => "None",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one request. `agent_kind` is `None` exactly when
/// `is_ai_visitor` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_ai_visitor: bool,
    pub agent_kind: AgentKind,
}

impl Classification {
    pub fn browser() -> Self {
        Self {
            is_ai_visitor: false,
            agent_kind: AgentKind::None,
        }
    }

    fn from_matches(matches: &[AgentKind]) -> Self {
        if matches.is_empty() {
            return Self::browser();
        }
        Self {
            is_ai_visitor: true,
            agent_kind: matches
                .iter()
                .copied()
                .filter(|kind| *kind != AgentKind::None)
                .min()
                .unwrap_or(AgentKind::Unknown),
        }
    }
}

/// Classifies a request from its headers and the query string of `url`.
pub fn classify(patterns: &[AgentPattern], headers: &HeaderMap, url: &Url) -> Classification {
    // Raw bytes: obs-text in a User-Agent must not hide an agent token.
    let ua = headers.get(USER_AGENT).map_or(&b""[..], |v| v.as_bytes());

    let mut matches: Vec<AgentKind> = patterns
        .iter()
        .filter(|p| p.regex.is_match(ua))
        .map(|p| p.kind)
        .collect();

    if has_chatgpt_override(url) {
        matches.push(AgentKind::ChatGptUser);
    }

    Classification::from_matches(&matches)
}

/// Only the first `user-agent` query value counts.
fn has_chatgpt_override(url: &Url) -> bool {
    url.query_pairs()
        .find(|(key, _)| key == OVERRIDE_PARAM)
        .map_or(false, |(_, value)| value.eq_ignore_ascii_case(OVERRIDE_CHATGPT))
}
