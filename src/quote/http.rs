//! HTTP Plumbing
//!
//! Builds the `reqwest` clients used by the sources and performs the GET
//! requests, treating any non-200 status as a failure.

use super::types::ErrorKind;

use anyhow::{Context, Result};
use std::time::Duration;

/// Per-request timeout of the source clients.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("quote-scraper/", env!("CARGO_PKG_VERSION"));

/// Builds a client, optionally routing every request through `proxy`
/// (`http://`, `https://` or `socks5://` URL).
pub fn build_client(proxy: Option<&str>, timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT);

    if let Some(proxy) = proxy.filter(|p| !p.is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).with_context(|| format!("invalid proxy URL: {:?}", proxy))?;
        builder = builder.proxy(proxy);
    }

    builder.build().context("failed to build HTTP client")
}

/// GETs `url` and returns the body.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, ErrorKind> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ErrorKind::from_reqwest(&e))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(ErrorKind::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| ErrorKind::from_reqwest(&e))
}
