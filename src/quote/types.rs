use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A price retrieved from a source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteResult {
    /// Name of the source that produced the quote.
    pub source: String,
    pub isin: String,
    /// Page or API endpoint the price was read from.
    pub url: String,
    pub price: f64,
    pub currency: String,
    pub date: NaiveDate,
}

/// Why a source could not produce a quote.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("request cancelled")]
    Cancelled,
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
    #[error("GET {url:?} with response status = {status}")]
    Status { url: String, status: u16 },
    #[error("invalid url {0:?}")]
    InvalidUrl(String),
    #[error("no result found")]
    NoResultFound,
    #[error("isin mismatch: found {found:?}")]
    IsinMismatch { found: String },
    #[error("parse search returned an empty info URL")]
    EmptyInfoUrl,
    #[error("price not found")]
    PriceNotFound,
    #[error("invalid price {0:?}")]
    InvalidPrice(String),
    #[error("date not found")]
    DateNotFound,
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("invalid JSON response: {0}")]
    Json(String),
    #[error("source reported an error: {0}")]
    Api(String),
}

impl ErrorKind {
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::Request(err.to_string())
        }
    }
}

/// A failed quote request, with enough context to be recorded against
/// the (isin, source) pair it belongs to.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("{kind} for isin {isin:?} from {source_name}")]
pub struct QuoteError {
    pub source_name: String,
    pub isin: String,
    pub url: Option<String>,
    pub kind: ErrorKind,
}

impl QuoteError {
    pub fn new(source_name: &str, isin: &str, url: Option<&str>, kind: ErrorKind) -> Self {
        Self {
            source_name: source_name.to_string(),
            isin: isin.to_string(),
            url: url.map(str::to_string),
            kind,
        }
    }

    /// True when the request was abandoned because another source already
    /// answered (or the whole run was cancelled), not because the source failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }
}

/// Returns the ISO 4217 code of the known currency names.
pub fn normalize_currency(currency: &str) -> String {
    let currency = currency.trim();
    if currency.eq_ignore_ascii_case("euro") {
        "EUR".to_string()
    } else {
        currency.to_string()
    }
}

/// Parses a price written either as `12.34` or in the European
/// `1.234,56` notation.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    normalized.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// The instruments a source is asked about, with the pool size it gets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceIsins {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    pub workers: usize,
    pub isins: Vec<String>,
}
