//! Configuration types
//!
//! `AppConfig` is loaded from YAML and/or the environment. The stream and
//! quote sections are owned by their modules and re-exported here.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::stream::normalize_symbol;

pub use crate::quotes::{QuoteProviderKind, QuotesConfig};
pub use crate::stream::StreamConfig;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Live trade stream settings
    pub stream: StreamConfig,
    /// One-shot REST quote settings
    pub quotes: QuotesConfig,
    /// Symbols the long-running binary subscribes to at startup
    pub symbols: Vec<String>,
}

impl AppConfig {
    /// Validate configuration rules
    ///
    /// Missing credentials are not an error: streaming and lookups degrade
    /// at runtime instead.
    pub fn validate(&self) -> Result<(), AppError> {
        // Rule: stream endpoint must be a WebSocket URL
        let ws_url = reqwest::Url::parse(&self.stream.ws_url).map_err(|e| {
            AppError::Config(format!("stream.ws_url '{}' is invalid: {}", self.stream.ws_url, e))
        })?;
        if !matches!(ws_url.scheme(), "ws" | "wss") {
            return Err(AppError::Config(format!(
                "stream.ws_url must use ws:// or wss:// (got {})",
                ws_url.scheme()
            )));
        }

        // Rule: a zero delay would reconnect in a hot loop
        if self.stream.reconnect_delay_ms == 0 {
            return Err(AppError::Config(
                "stream.reconnect_delay_ms must be > 0".to_string(),
            ));
        }

        if self.quotes.request_timeout_ms == 0 {
            return Err(AppError::Config(
                "quotes.request_timeout_ms must be > 0".to_string(),
            ));
        }

        for (field, url) in [
            ("quotes.finnhub_base_url", &self.quotes.finnhub_base_url),
            ("quotes.alphavantage_base_url", &self.quotes.alphavantage_base_url),
        ] {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| AppError::Config(format!("{} '{}' is invalid: {}", field, url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::Config(format!(
                    "{} must use http:// or https:// (got {})",
                    field,
                    parsed.scheme()
                )));
            }
        }

        // Rule: symbols are non-empty and unique once normalized
        let mut seen = std::collections::HashSet::new();
        for symbol in &self.symbols {
            let normalized = normalize_symbol(symbol);
            if normalized.is_empty() {
                return Err(AppError::Config("symbols cannot contain empty entries".to_string()));
            }
            if !seen.insert(normalized.clone()) {
                return Err(AppError::Config(format!("duplicate symbol '{}'", normalized)));
            }
        }

        Ok(())
    }

    /// Configured symbols, normalized
    pub fn normalized_symbols(&self) -> Vec<String> {
        self.symbols.iter().map(|s| normalize_symbol(s)).collect()
    }
}
