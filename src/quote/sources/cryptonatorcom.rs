//! cryptonator.com: JSON ticker API for cryptocurrencies.
//!
//! The "isin" of a cryptocurrency is its ticker symbol (e.g. `BTC`); the
//! price is quoted in the currency the getter was created with.

use crate::quote::getter::QuoteGetter;
use crate::quote::http::fetch_text;
use crate::quote::types::{ErrorKind, QuoteError, QuoteResult};

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

pub const BASE_URL: &str = "https://api.cryptonator.com/api/ticker";

#[derive(Debug, Deserialize)]
struct Ticker {
    #[serde(default)]
    base: String,
    #[serde(default)]
    target: String,
    #[serde(default)]
    price: String,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(default)]
    ticker: Option<Ticker>,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: String,
}

pub struct Cryptonatorcom {
    name: String,
    client: reqwest::Client,
    currency: String,
    base_url: String,
}

impl Cryptonatorcom {
    pub fn new(name: &str, client: reqwest::Client, currency: &str) -> Self {
        Self::with_base_url(name, client, currency, BASE_URL)
    }

    pub fn with_base_url(name: &str, client: reqwest::Client, currency: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            client,
            currency: currency.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn ticker_url(&self, crypto: &str) -> String {
        format!(
            "{}/{}-{}",
            self.base_url,
            crypto.to_lowercase(),
            self.currency.to_lowercase()
        )
    }

    fn parse_json(&self, body: &str, url: &str) -> Result<QuoteResult, ErrorKind> {
        let response: TickerResponse = serde_json::from_str(body).map_err(|e| ErrorKind::Json(e.to_string()))?;

        if !response.success {
            return Err(ErrorKind::Api(response.error));
        }

        let ticker = response.ticker.ok_or(ErrorKind::PriceNotFound)?;
        if ticker.price.is_empty() {
            return Err(ErrorKind::PriceNotFound);
        }
        let price: f64 = ticker
            .price
            .trim()
            .parse()
            .map_err(|_| ErrorKind::InvalidPrice(ticker.price.clone()))?;

        let date = DateTime::from_timestamp(response.timestamp, 0)
            .ok_or_else(|| ErrorKind::InvalidDate(response.timestamp.to_string()))?
            .date_naive();

        Ok(QuoteResult {
            source: self.name.clone(),
            isin: ticker.base,
            url: url.to_string(),
            price,
            currency: ticker.target,
            date,
        })
    }
}

#[async_trait]
impl QuoteGetter for Cryptonatorcom {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_quote(&self, crypto: &str, url: Option<&str>) -> Result<QuoteResult, QuoteError> {
        let url = match url.filter(|u| !u.is_empty()) {
            Some(u) => u.to_string(),
            None => self.ticker_url(crypto),
        };

        let body = fetch_text(&self.client, &url)
            .await
            .map_err(|kind| QuoteError::new(&self.name, crypto, Some(&url), kind))?;

        self.parse_json(&body, &url)
            .map_err(|kind| QuoteError::new(&self.name, crypto, Some(&url), kind))
    }
}
