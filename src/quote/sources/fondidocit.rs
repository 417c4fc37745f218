//! fondidoc.it: Italian fund database, scraped.
//!
//! The search page lists matches as table rows whose second cell links to
//! the fund page and whose third cell holds the ISIN. The fund page shows the
//! ISIN in the header and the quote in the `dd` items of `div.dett-cont`:
//! frequency, currency, date, price, change.

use crate::quote::scraper::{inner_text, HtmlScraper, ParseInfoResult};
use crate::quote::types::ErrorKind;

use regex::Regex;
use std::sync::LazyLock;

pub const BASE_URL: &str = "https://www.fondidoc.it";

static ROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<tr[\s>].*?</tr>").expect("valid row regex"));
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("valid cell regex"));
static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\s[^>]*href\s*=\s*"([^"]*)""#).expect("valid href regex"));
static HEADER_ISIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div[^>]*class\s*=\s*"page-header"[^>]*>.*?<small[^>]*>(.*?)</small>"#)
        .expect("valid header regex")
});
static DETAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<div[^>]*class\s*=\s*"dett-cont"[^>]*>"#).expect("valid detail regex"));
static DD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<dd[^>]*>(.*?)</dd>").expect("valid dd regex"));

const DD_CURRENCY: usize = 1;
const DD_DATE: usize = 2;
const DD_PRICE: usize = 3;

pub struct Fondidocit {
    name: String,
    base_url: String,
}

impl Fondidocit {
    pub fn new(name: &str) -> Self {
        Self::with_base_url(name, BASE_URL)
    }

    pub fn with_base_url(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl HtmlScraper for Fondidocit {
    fn name(&self) -> &str {
        &self.name
    }

    fn search_url(&self, isin: &str) -> Option<String> {
        Some(format!(
            "{}/Ricerca/Res?txt={}&tipi=&societa=&pag=0&sort=&sortDir=&fldis=&nview=20&viewMode=anls&filters=&pir=0",
            self.base_url, isin
        ))
    }

    fn parse_search(&self, html: &str, isin: &str) -> Result<String, ErrorKind> {
        for row in ROW.find_iter(html) {
            let cells: Vec<&str> = CELL
                .captures_iter(row.as_str())
                .take(3)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect();
            if cells.len() < 3 {
                continue;
            }

            let href = HREF
                .captures(cells[1])
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim())
                .unwrap_or_default();

            if !href.is_empty() && inner_text(cells[2]) == isin {
                return Ok(href.replace("&amp;", "&"));
            }
        }
        Err(ErrorKind::NoResultFound)
    }

    fn parse_info(&self, html: &str) -> Result<ParseInfoResult, ErrorKind> {
        let mut info = ParseInfoResult {
            date_layout: "%d/%m/%Y".to_string(),
            ..Default::default()
        };

        if let Some(small) = HEADER_ISIN.captures(html).and_then(|c| c.get(1)) {
            info.isin = inner_text(small.as_str());
        }

        if let Some(detail) = DETAIL.find(html) {
            let items: Vec<String> = DD
                .captures_iter(&html[detail.end()..])
                .take(DD_PRICE + 1)
                .filter_map(|c| c.get(1).map(|m| inner_text(m.as_str())))
                .collect();

            let item = |i: usize| items.get(i).cloned().unwrap_or_default();
            info.currency = item(DD_CURRENCY);
            info.date = item(DD_DATE);
            info.price = item(DD_PRICE);
        }

        if info.date.is_empty() && info.price.is_empty() {
            return Err(ErrorKind::NoResultFound);
        }
        Ok(info)
    }
}
