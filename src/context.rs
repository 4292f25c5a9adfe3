use axum::http::{header::HOST, HeaderMap, Method, Uri};
use bytes::Bytes;
use url::Url;

use crate::error::AppError;

/// An inbound request with its absolute URL resolved and its body read once,
/// so the same bytes can be replayed against every origin attempt.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IncomingRequest {
    pub fn new(method: Method, url: Url, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// Builds an `IncomingRequest` from the parts of a server-side request.
    /// The scheme comes from an absolute URI, then `X-Forwarded-Proto`, then
    /// `default_scheme`; the authority from the URI or the `Host` header.
    pub fn from_parts(
        method: Method,
        uri: &Uri,
        headers: HeaderMap,
        body: Bytes,
        default_scheme: &str,
    ) -> Result<Self, AppError> {
        let scheme = uri
            .scheme_str()
            .map(str::to_string)
            .or_else(|| {
                headers
                    .get("x-forwarded-proto")
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
            })
            .unwrap_or_else(|| default_scheme.to_string());

        let authority = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                headers
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .ok_or(AppError::MissingHost)?;

        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

        let url = Url::parse(&format!("{}://{}{}", scheme, authority, path_and_query))?;

        Ok(Self::new(method, url, headers, body))
    }

    /// `scheme://host[:port]` of the request, i.e. the live webserver.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// The query string including its leading `?`, or empty.
    pub fn search(&self) -> String {
        self.url
            .query()
            .map(|q| format!("?{}", q))
            .unwrap_or_default()
    }
}
