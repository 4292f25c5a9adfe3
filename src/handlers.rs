use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use crate::{config::AppConfig, context::IncomingRequest, proxy::FallbackRouter};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub router: FallbackRouter,
}

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Bodies over the router's `DefaultBodyLimit` are rejected with 413 by the
/// `Bytes` extractor before reaching this handler.
pub async fn route_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let incoming =
        match IncomingRequest::from_parts(method, &uri, headers, body, &state.config.default_scheme)
        {
            Ok(incoming) => incoming,
            Err(e) => {
                error!("Rejected inbound request: {}", e);
                return e.into_response();
            }
        };

    match state.router.handle(incoming).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            error!("Proxy error: {:?}", e);
            e.into_response()
        }
    }
}
