use once_cell::sync::Lazy;
use reqwest::redirect::Policy;
use std::time::Duration;

/// Shared upstream client. Redirects are never followed here and bodies are
/// never decompressed, so upstream responses pass through untouched. Only
/// connection setup is bounded; slow responses and long bodies are not.
pub static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .no_gzip()
        .no_brotli()
        .pool_idle_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(32)
        .tcp_keepalive(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
});
