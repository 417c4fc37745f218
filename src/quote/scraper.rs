//! HTML Scraper Framework
//!
//! Most sources publish prices on web pages: a search page resolves the ISIN
//! to an instrument page, and the instrument page carries the price. Sources
//! of this kind only implement `HtmlScraper`; `ScraperGetter` performs the
//! requests and turns the extracted strings into a validated `QuoteResult`.

use super::getter::QuoteGetter;
use super::http::fetch_text;
use super::types::{normalize_currency, parse_price, ErrorKind, QuoteError, QuoteResult};

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]*);").expect("valid entity regex"));

/// Named entities found on the scraped pages (Italian accents included).
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("nbsp", ' '),
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("euro", '€'),
    ("pound", '£'),
    ("dollar", '$'),
    ("yen", '¥'),
    ("agrave", 'à'),
    ("egrave", 'è'),
    ("eacute", 'é'),
    ("igrave", 'ì'),
    ("ograve", 'ò'),
    ("ugrave", 'ù'),
    ("Agrave", 'À'),
    ("Egrave", 'È'),
    ("Eacute", 'É'),
];

/// Raw fields extracted from an instrument page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseInfoResult {
    /// ISIN printed on the page, empty when the page does not show one.
    pub isin: String,
    pub price: String,
    pub currency: String,
    pub date: String,
    /// `chrono` format of `date`, e.g. `%d/%m/%Y`.
    pub date_layout: String,
}

/// Page level logic of a scraped source.
pub trait HtmlScraper: Send + Sync {
    fn name(&self) -> &str;

    /// URL of the search page for `isin`, or `None` when the source has no
    /// search step and `info_url` must be used.
    fn search_url(&self, isin: &str) -> Option<String>;

    /// Extracts the instrument page link for `isin` from the search page.
    fn parse_search(&self, html: &str, isin: &str) -> Result<String, ErrorKind>;

    /// Direct instrument page URL for sources without a search step.
    fn info_url(&self, _isin: &str) -> Option<String> {
        None
    }

    fn parse_info(&self, html: &str) -> Result<ParseInfoResult, ErrorKind>;
}

/// Adapts an `HtmlScraper` to the `QuoteGetter` interface.
pub struct ScraperGetter<S> {
    scraper: S,
    client: reqwest::Client,
}

impl<S: HtmlScraper> ScraperGetter<S> {
    pub fn new(scraper: S, client: reqwest::Client) -> Self {
        Self { scraper, client }
    }

    async fn resolve_info_url(&self, isin: &str) -> Result<String, ErrorKind> {
        let Some(search_url) = self.scraper.search_url(isin) else {
            return self.scraper.info_url(isin).ok_or(ErrorKind::NoResultFound);
        };

        let html = fetch_text(&self.client, &search_url).await?;
        let href = self.scraper.parse_search(&html, isin)?;
        if href.trim().is_empty() {
            return Err(ErrorKind::EmptyInfoUrl);
        }
        resolve_url(&search_url, href.trim())
    }

    async fn scrape(&self, isin: &str, url: &str) -> Result<QuoteResult, ErrorKind> {
        let html = fetch_text(&self.client, url).await?;
        let info = self.scraper.parse_info(&html)?;

        if !info.isin.is_empty() && !info.isin.eq_ignore_ascii_case(isin) {
            return Err(ErrorKind::IsinMismatch { found: info.isin });
        }

        if info.price.trim().is_empty() {
            return Err(ErrorKind::PriceNotFound);
        }
        let price = parse_price(&info.price).ok_or_else(|| ErrorKind::InvalidPrice(info.price.clone()))?;

        if info.date.trim().is_empty() {
            return Err(ErrorKind::DateNotFound);
        }
        let date = NaiveDate::parse_from_str(info.date.trim(), &info.date_layout)
            .map_err(|_| ErrorKind::InvalidDate(info.date.clone()))?;

        Ok(QuoteResult {
            source: self.scraper.name().to_string(),
            isin: isin.to_string(),
            url: url.to_string(),
            price,
            currency: normalize_currency(&info.currency),
            date,
        })
    }
}

#[async_trait]
impl<S: HtmlScraper> QuoteGetter for ScraperGetter<S> {
    fn name(&self) -> &str {
        self.scraper.name()
    }

    async fn get_quote(&self, isin: &str, url: Option<&str>) -> Result<QuoteResult, QuoteError> {
        let name = self.scraper.name();

        let url = match url.filter(|u| !u.is_empty()) {
            Some(u) => u.to_string(),
            None => self
                .resolve_info_url(isin)
                .await
                .map_err(|kind| QuoteError::new(name, isin, None, kind))?,
        };

        self.scrape(isin, &url)
            .await
            .map_err(|kind| QuoteError::new(name, isin, Some(&url), kind))
    }
}

/// Resolves a possibly relative link against the page it was found on.
pub fn resolve_url(base: &str, href: &str) -> Result<String, ErrorKind> {
    let base = reqwest::Url::parse(base).map_err(|_| ErrorKind::InvalidUrl(base.to_string()))?;
    base.join(href)
        .map(|u| u.to_string())
        .map_err(|_| ErrorKind::InvalidUrl(href.to_string()))
}

/// Text content of an HTML fragment, with tags removed, entities decoded and
/// whitespace collapsed.
pub fn inner_text(fragment: &str) -> String {
    let text = TAG.replace_all(fragment, " ");
    let text = decode_entities(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decodes decimal (`&#8364;`) and hexadecimal (`&#x20AC;`) character
/// references and the entities of `NAMED_ENTITIES`, in a single pass.
/// Unknown names and invalid code points are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                NAMED_ENTITIES.iter().find(|(name, _)| *name == body).map(|&(_, c)| c)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
