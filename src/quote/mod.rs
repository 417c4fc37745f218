//! Quote Retrieval
//!
//! Retrieves instrument prices from several public sources concurrently,
//! using the task engine to let the sources race on each ISIN.
//!
//! ## Responsibilities
//! - **Sources**: HTML scrapers and JSON APIs behind the `QuoteGetter` trait.
//! - **Registry**: Lookup of the available sources by name.
//! - **Orchestration**: Mapping sources to workers and ISINs to tasks.
//! - **Tor check**: Verifying that a proxy routes through Tor.
//!
//! ## Submodules
//! - **`types`**: Quote results, errors and value normalization.
//! - **`getter`**: The `QuoteGetter` trait.
//! - **`http`**: Client construction and GET requests.
//! - **`scraper`**: Two-step (search page, instrument page) scraping framework.
//! - **`sources`**: The built-in sources.
//! - **`registry`**: `SourceRegistry`.
//! - **`get`**: `get_quotes`, the retrieval entry point.
//! - **`tor`**: Tor connection check.

pub mod get;
pub mod getter;
pub mod http;
pub mod registry;
pub mod scraper;
pub mod sources;
pub mod tor;
pub mod types;

pub use get::{get_quotes, GetRequest, IsinTask, QuoteOutcome};
pub use getter::QuoteGetter;
pub use registry::SourceRegistry;
pub use types::{normalize_currency, ErrorKind, QuoteError, QuoteResult, SourceIsins};
