//! Alpha Vantage REST quotes
//!
//! `GET {base}/query?function=GLOBAL_QUOTE&symbol=SYM&apikey=KEY`. Numbers
//! arrive as strings under numbered keys; rate limits and bad keys are
//! reported with HTTP 200 and a `Note`, `Information` or `Error Message`
//! field instead of a quote.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::constants;
use crate::stream::normalize_symbol;

use super::errors::{QuoteError, QuoteResult};
use super::http::{create_http_client, endpoint};
use super::traits::QuoteProvider;
use super::types::Quote;

pub const DEFAULT_ALPHAVANTAGE_URL: &str = "https://www.alphavantage.co";

const PROVIDER_NAME: &str = "alphavantage";
const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

#[derive(Clone)]
pub struct AlphaVantageConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ALPHAVANTAGE_URL.to_string(),
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_key", &constants::redacted(self.api_key.as_deref()))
            .field("base_url", &self.base_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl AlphaVantageConfig {
    pub fn credential(&self) -> Option<&str> {
        constants::valid_credential(self.api_key.as_deref())
    }
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price", default)]
    price: Option<String>,
    #[serde(rename = "07. latest trading day", default)]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close", default)]
    previous_close: Option<String>,
    #[serde(rename = "09. change", default)]
    change: Option<String>,
    #[serde(rename = "10. change percent", default)]
    change_percent: Option<String>,
}

/// "0.7376%" -> 0.7376
fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw?.trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

impl GlobalQuoteResponse {
    fn into_quote(self, symbol: &str) -> QuoteResult<Quote> {
        if let Some(reason) = self.error_message.or(self.note).or(self.information) {
            return Err(QuoteError::InvalidResponse(format!("{}: {}", PROVIDER_NAME, reason)));
        }

        let quote = self.global_quote.unwrap_or_default();
        let current_price = parse_number(quote.price.as_deref())
            .filter(|p| *p > 0.0)
            .ok_or_else(|| {
                QuoteError::InvalidResponse(format!("{} has no price for {}", PROVIDER_NAME, symbol))
            })?;

        let timestamp = quote
            .latest_trading_day
            .as_deref()
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc());

        Ok(Quote {
            symbol: symbol.to_string(),
            current_price,
            change: parse_number(quote.change.as_deref()),
            percent_change: parse_number(quote.change_percent.as_deref()),
            previous_close: parse_number(quote.previous_close.as_deref()),
            timestamp,
        })
    }
}

// =============================================================================
// Provider
// =============================================================================

pub struct AlphaVantageProvider {
    config: AlphaVantageConfig,
    http: reqwest::Client,
}

impl AlphaVantageProvider {
    pub fn new(config: AlphaVantageConfig) -> Self {
        let http = create_http_client(
            PROVIDER_NAME,
            Duration::from_millis(config.request_timeout_ms),
        );
        Self { config, http }
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
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
            .get(endpoint(&self.config.base_url, "query"))
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol.as_str()),
                ("apikey", key),
            ])
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

        let body: GlobalQuoteResponse = response
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
