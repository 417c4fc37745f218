use super::types::{QuoteError, QuoteResult};

use async_trait::async_trait;

/// A source able to price an instrument.
///
/// Implementations are shared by every instance of the source's worker pool,
/// so they must be usable concurrently.
#[async_trait]
pub trait QuoteGetter: Send + Sync {
    /// Unique source name, used as the worker id.
    fn name(&self) -> &str;

    /// Retrieves the latest quote of `isin`. When `url` is given the source
    /// reads that page directly instead of searching for the instrument.
    async fn get_quote(&self, isin: &str, url: Option<&str>) -> Result<QuoteResult, QuoteError>;
}
