use axum::http::{
    header::{CACHE_CONTROL, HOST, PRAGMA},
    HeaderMap, HeaderValue,
};
use tracing::debug;
use url::Url;

use super::client::CLIENT;
use crate::{context::IncomingRequest, error::AppError};

const NO_CACHE: &str = "no-cache, no-store, max-age=0";

/// One candidate destination for a proxied request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginTarget {
    /// Scheme, authority and optional path prefix, without a trailing slash.
    pub base_origin: String,
    pub fix_host_header: bool,
    pub bypass_cache: bool,
    pub log_url: bool,
}

impl OriginTarget {
    /// The authoritative site, addressed by its own host.
    pub fn webserver(origin: impl Into<String>) -> Self {
        Self {
            base_origin: origin.into(),
            fix_host_header: true,
            bypass_cache: false,
            log_url: false,
        }
    }

    /// The storage-backed origin. It must see its native host and is never
    /// served from an intermediary cache.
    pub fn alternate(origin: impl Into<String>) -> Self {
        Self {
            base_origin: origin.into(),
            fix_host_header: false,
            bypass_cache: true,
            log_url: true,
        }
    }

    pub fn url_for(&self, path: &str, search: &str) -> Result<Url, AppError> {
        Ok(Url::parse(&format!("{}{}{}", self.base_origin, path, search))?)
    }

    /// Headers to send upstream: a copy of the inbound set with `Host`
    /// and cache directives adjusted for this target.
    pub fn outbound_headers(&self, inbound: &HeaderMap, url: &Url) -> Result<HeaderMap, AppError> {
        let mut headers = inbound.clone();

        if self.fix_host_header {
            let authority = host_with_port(url).ok_or(AppError::MissingHost)?;
            headers.insert(
                HOST,
                HeaderValue::from_str(&authority).map_err(|_| AppError::InvalidHeader)?,
            );
        } else {
            headers.remove(HOST);
        }

        if self.bypass_cache {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        }

        Ok(headers)
    }
}

fn host_with_port(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Sends `inbound` to `target` at `path` + `search`. Transport failures are
/// returned to the caller untouched.
pub async fn fetch_from(
    target: &OriginTarget,
    path: &str,
    search: &str,
    inbound: &IncomingRequest,
) -> Result<reqwest::Response, AppError> {
    let url = target.url_for(path, search)?;
    if target.log_url {
        debug!(url = %url, "Alternate origin fetch");
    }

    let headers = target.outbound_headers(&inbound.headers, &url)?;

    let response = CLIENT
        .request(inbound.method.clone(), url)
        .headers(headers)
        .body(inbound.body.clone())
        .send()
        .await?;

    Ok(response)
}
