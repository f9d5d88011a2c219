//! Finnhub REST quotes
//!
//! `GET {base}/quote?symbol=SYM&token=KEY` answers
//! `{"c":150.25,"d":1.1,"dp":0.74,"h":151,"l":149,"o":149.5,"pc":149.15,"t":1700000000}`.
//! Unknown symbols come back as an all-zero payload rather than an error.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::constants;
use crate::stream::normalize_symbol;

use super::errors::{QuoteError, QuoteResult};
use super::http::{create_http_client, endpoint};
use super::traits::QuoteProvider;
use super::types::Quote;

// =============================================================================
// Constants
// =============================================================================

pub const DEFAULT_FINNHUB_URL: &str = "https://finnhub.io/api/v1";

const PROVIDER_NAME: &str = "finnhub";
const API_KEY_ENV: &str = "FINNHUB_API_KEY";

// =============================================================================
// Configuration
// =============================================================================

#[derive(Clone)]
pub struct FinnhubConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for FinnhubConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_FINNHUB_URL.to_string(),
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for FinnhubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinnhubConfig")
            .field("api_key", &constants::redacted(self.api_key.as_deref()))
            .field("base_url", &self.base_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl FinnhubConfig {
    pub fn credential(&self) -> Option<&str> {
        constants::valid_credential(self.api_key.as_deref())
    }
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    /// Current price
    #[serde(default)]
    c: Option<f64>,
    /// Change
    #[serde(default)]
    d: Option<f64>,
    /// Percent change
    #[serde(default)]
    dp: Option<f64>,
    /// Previous close
    #[serde(default)]
    pc: Option<f64>,
    /// Unix seconds
    #[serde(default)]
    t: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

impl FinnhubQuote {
    fn into_quote(self, symbol: &str) -> QuoteResult<Quote> {
        if let Some(error) = self.error {
            return Err(QuoteError::InvalidResponse(format!("{}: {}", PROVIDER_NAME, error)));
        }

        let current_price = match self.c {
            Some(price) if price > 0.0 && price.is_finite() => price,
            _ => {
                return Err(QuoteError::InvalidResponse(format!(
                    "{} has no price for {}",
                    PROVIDER_NAME, symbol
                )))
            }
        };

        Ok(Quote {
            symbol: symbol.to_string(),
            current_price,
            change: self.d,
            percent_change: self.dp,
            previous_close: self.pc.filter(|pc| *pc > 0.0),
            timestamp: self
                .t
                .filter(|t| *t > 0)
                .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0)),
        })
    }
}

// =============================================================================
// Provider
// =============================================================================

pub struct FinnhubProvider {
    config: FinnhubConfig,
    http: reqwest::Client,
}

impl FinnhubProvider {
    pub fn new(config: FinnhubConfig) -> Self {
        let http = create_http_client(
            PROVIDER_NAME,
            Duration::from_millis(config.request_timeout_ms),
        );
        Self { config, http }
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    async fn fetch_quote(&self, symbol: &str) -> QuoteResult<Quote> {
        let key = self.config.credential().ok_or(QuoteError::NotConfigured {
            provider: PROVIDER_NAME,
            env_var: API_KEY_ENV,
        })?;
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(QuoteError::InvalidSymbol(symbol));
        }

        let response = self
            .http
            .get(endpoint(&self.config.base_url, "quote"))
            .query(&[("symbol", symbol.as_str()), ("token", key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(provider = PROVIDER_NAME, symbol = %symbol, status = %status, "Quote request rejected");
            return Err(QuoteError::Fetch(format!(
                "{} returned HTTP {}",
                PROVIDER_NAME, status
            )));
        }

        let body: FinnhubQuote = response
            .json()
            .await
            .map_err(|e| QuoteError::InvalidResponse(e.without_url().to_string()))?;
        let quote = body.into_quote(&symbol)?;

        tracing::debug!(provider = PROVIDER_NAME, symbol = %symbol, price = quote.current_price, "Quote fetched");
        Ok(quote)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn is_configured(&self) -> bool {
        self.config.credential().is_some()
    }
}
