//! Quote lookup error types
//!
//! Messages are safe to show to users: request URLs (which carry the API
//! key) are stripped from transport errors.

use thiserror::Error;

/// Error types for one-shot quote lookups
#[derive(Error, Debug)]
pub enum QuoteError {
    /// No usable credential for the selected provider; no request was made
    #[error("{provider} quotes are not configured: set {env_var}")]
    NotConfigured {
        provider: &'static str,
        env_var: &'static str,
    },

    /// Transport failure or non-success HTTP status
    #[error("Quote fetch failed: {0}")]
    Fetch(String),

    /// The vendor answered but the payload carries no usable price
    #[error("Invalid quote response: {0}")]
    InvalidResponse(String),

    /// Symbol is empty after normalization
    #[error("Invalid symbol: '{0}'")]
    InvalidSymbol(String),

    /// Provider name not recognized by the factory
    #[error("Unknown quote provider: '{0}'. Supported: finnhub, alphavantage")]
    UnknownProvider(String),
}

impl From<reqwest::Error> for QuoteError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            QuoteError::Fetch(format!("request timed out: {}", err))
        } else {
            QuoteError::Fetch(err.to_string())
        }
    }
}

/// Result type alias for quote operations
pub type QuoteResult<T> = std::result::Result<T, QuoteError>;
