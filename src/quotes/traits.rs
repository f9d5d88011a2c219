//! Quote provider trait definition

use async_trait::async_trait;

use super::errors::QuoteResult;
use super::types::Quote;

/// One-shot REST quote source
///
/// Implementations must fail with `QuoteError::NotConfigured` before any
/// network activity when their credential is missing. Failed lookups are
/// not retried.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the latest price snapshot for `symbol` (case-insensitive).
    async fn fetch_quote(&self, symbol: &str) -> QuoteResult<Quote>;

    /// Short provider name used in logs and errors
    fn provider_name(&self) -> &'static str;

    /// True when a usable credential is present
    fn is_configured(&self) -> bool;
}
