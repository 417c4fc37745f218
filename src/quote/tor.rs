//! Tor connection check, used to verify a proxy before sending requests through it.

use super::http::fetch_text;
use super::scraper::inner_text;

use anyhow::{bail, Result};
use regex::Regex;
use std::sync::LazyLock;

pub const TOR_CHECK_URL: &str = "https://check.torproject.org";

/// Heading of the check page when the request came through Tor.
pub const TOR_CONGRATULATIONS: &str = "Congratulations. This browser is configured to use Tor.";

static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("valid h1 regex"));

/// Outcome of a Tor check.
#[derive(Debug, Clone, PartialEq)]
pub struct TorStatus {
    pub using_tor: bool,
    /// Heading of the check page.
    pub message: String,
}

/// Checks whether `client` reaches the internet through Tor.
pub async fn tor_check(client: &reqwest::Client) -> Result<TorStatus> {
    tor_check_url(client, TOR_CHECK_URL).await
}

/// Same as `tor_check`, against an arbitrary check page.
pub async fn tor_check_url(client: &reqwest::Client, url: &str) -> Result<TorStatus> {
    let html = fetch_text(client, url).await?;

    let Some(message) = parse_tor_message(&html) else {
        bail!("can't determine if you are using Tor");
    };

    tracing::debug!("Tor check page says: {}", message);

    Ok(TorStatus {
        using_tor: message == TOR_CONGRATULATIONS,
        message,
    })
}

/// Text of the `h1` headings of the page, `None` when empty.
pub fn parse_tor_message(html: &str) -> Option<String> {
    let message = H1
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| inner_text(m.as_str())))
        .collect::<Vec<_>>()
        .join(" ");
    let message = message.trim().to_string();
    (!message.is_empty()).then_some(message)
}
