use axum::{
    body::Body,
    http::{header::VARY, HeaderMap, HeaderValue, Response},
};
use futures_util::StreamExt;
use tracing::error;

/// Copies the upstream headers and forces `Vary: User-Agent`, replacing
/// whatever the origin sent.
pub fn normalize_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    headers.insert(VARY, HeaderValue::from_static("User-Agent"));
    headers
}

/// Turns the terminal upstream response into the client response. Status
/// and body pass through; the body is streamed, never buffered.
pub fn compose(response: reqwest::Response) -> Response<Body> {
    let status = response.status();
    let headers = normalize_headers(response.headers());

    let stream = response.bytes_stream().map(|result| match result {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            error!("Upstream body stream error: {}", e);
            Err(std::io::Error::new(std::io::ErrorKind::Other, e))
        }
    });

    let mut client_response = Response::new(Body::from_stream(stream));
    *client_response.status_mut() = status;
    *client_response.headers_mut() = headers;
    client_response
}
