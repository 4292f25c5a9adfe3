//! Routes AI agents to a pre-rendered origin and everyone else to the live
//! webserver, with fallback, a single redirect hop and detached visit
//! reporting.

pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod proxy;
pub mod telemetry;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::{
    config::{AppConfig, RouterConfig},
    handlers::AppState,
    proxy::FallbackRouter,
    telemetry::{access_log_middleware, CollectorSink, TelemetryReporter},
};

/// A router posting visit events to the configured collector.
pub fn build_router(config: Arc<RouterConfig>) -> FallbackRouter {
    let sink = Arc::new(CollectorSink::new(config.telemetry_endpoint.clone()));
    let reporter = TelemetryReporter::new(sink, config.organization_id.clone());
    FallbackRouter::new(config, reporter)
}

/// The HTTP application: `/health` plus everything else through the router.
/// Inbound bodies are capped at `config.max_body_bytes`.
pub fn app(config: Arc<AppConfig>, router: FallbackRouter) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .fallback(handlers::route_request)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(from_fn(access_log_middleware))
        .with_state(AppState { config, router })
}
