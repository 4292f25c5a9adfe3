//! Dual-origin routing.
//!
//! Browsers go straight to the live webserver. AI visitors are tried
//! against the alternate origin first; any non-2xx there falls back to the
//! live webserver, which may redirect at most once more.

use axum::{
    body::Body,
    http::{header::LOCATION, Response},
};
use std::{fmt, sync::Arc};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    classifier::{classify, Classification},
    config::RouterConfig,
    context::IncomingRequest,
    error::AppError,
    telemetry::TelemetryReporter,
};

mod client;
mod origin;
mod response;

pub use client::CLIENT;
pub use origin::{fetch_from, OriginTarget};
pub use response::{compose, normalize_headers};

/// Terminal state that produced the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Browser traffic served by the live webserver.
    Direct,
    /// AI traffic served by the alternate origin.
    AlternateHit,
    /// Alternate origin missed; live webserver response returned.
    Fallback,
    /// Alternate origin missed and the live webserver's redirect was
    /// followed once.
    RedirectFollowed,
}

impl fmt::Display for RouteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteOutcome::Direct => "direct",
            RouteOutcome::AlternateHit => "alternate_hit",
            RouteOutcome::Fallback => "fallback",
            RouteOutcome::RedirectFollowed => "redirect_followed",
        };
        f.write_str(name)
    }
}

/// The upstream response chosen for a request, before header normalization.
#[derive(Debug)]
pub struct RoutedResponse {
    pub classification: Classification,
    pub outcome: RouteOutcome,
    pub response: reqwest::Response,
}

#[derive(Clone)]
pub struct FallbackRouter {
    config: Arc<RouterConfig>,
    reporter: TelemetryReporter,
}

impl FallbackRouter {
    pub fn new(config: Arc<RouterConfig>, reporter: TelemetryReporter) -> Self {
        Self { config, reporter }
    }

    /// Routes `request` and returns the client response with normalized
    /// headers. Transport failures propagate to the caller.
    pub async fn handle(&self, request: IncomingRequest) -> Result<Response<Body>, AppError> {
        let routed = self.route(&request).await?;
        info!(
            outcome = %routed.outcome,
            status = routed.response.status().as_u16(),
            bot_type = %routed.classification.agent_kind,
            path = %request.path(),
            "Routed request"
        );
        Ok(compose(routed.response))
    }

    /// Runs the classification and origin selection state machine.
    pub async fn route(&self, request: &IncomingRequest) -> Result<RoutedResponse, AppError> {
        let classification = classify(&self.config.agent_patterns, &request.headers, &request.url);
        let webserver = request.origin();
        let path = request.path();
        let search = request.search();

        debug!(
            user_agent = ?request.headers.get("user-agent"),
            origin = %webserver,
            "Classifying request"
        );

        if !classification.is_ai_visitor {
            debug!("Browser traffic → live webserver {}{}", path, search);
            let response =
                fetch_from(&OriginTarget::webserver(&webserver), path, &search, request).await?;
            return Ok(RoutedResponse {
                classification,
                outcome: RouteOutcome::Direct,
                response,
            });
        }

        info!(bot_type = %classification.agent_kind, url = %request.url, "AI visitor");
        // Detached; never awaited on the request path.
        let _ = self.reporter.report(&classification, request.url.as_str());

        let alternate = OriginTarget::alternate(&self.config.alternate_origin);
        let alt_response = fetch_from(&alternate, path, &search, request).await?;
        debug!("Alternate status {} for {}{}", alt_response.status(), path, search);

        if alt_response.status().is_success() {
            return Ok(RoutedResponse {
                classification,
                outcome: RouteOutcome::AlternateHit,
                response: alt_response,
            });
        }

        info!(
            status = alt_response.status().as_u16(),
            "Alternate miss, falling back to live webserver for {}", path
        );
        let fallback =
            fetch_from(&OriginTarget::webserver(&webserver), path, &search, request).await?;

        let Some(target) = redirect_target(&fallback, &webserver) else {
            return Ok(RoutedResponse {
                classification,
                outcome: RouteOutcome::Fallback,
                response: fallback,
            });
        };

        info!(location = %target, "Following live webserver redirect");
        let target_origin = target.origin().ascii_serialization();
        let search = target
            .query()
            .map(|q| format!("?{}", q))
            .unwrap_or_default();
        let response = fetch_from(
            &OriginTarget::webserver(target_origin),
            target.path(),
            &search,
            request,
        )
        .await?;

        Ok(RoutedResponse {
            classification,
            outcome: RouteOutcome::RedirectFollowed,
            response,
        })
    }
}

/// The resolved `Location` of a 3xx response, relative to `base`. A redirect
/// whose `Location` is missing, empty or unparseable is not followed.
fn redirect_target(response: &reqwest::Response, base: &str) -> Option<Url> {
    if !response.status().is_redirection() {
        return None;
    }
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())?;

    let target = resolve_location(location, base);
    if target.is_none() {
        warn!(location = %location, "Unparseable redirect target, returning redirect as-is");
    }
    target
}

pub fn resolve_location(location: &str, base: &str) -> Option<Url> {
    Url::parse(base).ok()?.join(location).ok()
}
