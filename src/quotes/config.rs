//! Quote Provider Configuration
//!
//! Provider selection plus credentials and endpoints for each REST backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::constants;

use super::alphavantage::{AlphaVantageConfig, DEFAULT_ALPHAVANTAGE_URL};
use super::errors::QuoteError;
use super::finnhub::{FinnhubConfig, DEFAULT_FINNHUB_URL};

// =============================================================================
// Provider Selection
// =============================================================================

/// Supported REST quote backends
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuoteProviderKind {
    #[default]
    Finnhub,
    #[serde(alias = "alpha_vantage")]
    AlphaVantage,
}

impl fmt::Display for QuoteProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteProviderKind::Finnhub => write!(f, "finnhub"),
            QuoteProviderKind::AlphaVantage => write!(f, "alphavantage"),
        }
    }
}

impl FromStr for QuoteProviderKind {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finnhub" => Ok(QuoteProviderKind::Finnhub),
            "alphavantage" | "alpha_vantage" | "alpha-vantage" => {
                Ok(QuoteProviderKind::AlphaVantage)
            }
            other => Err(QuoteError::UnknownProvider(other.to_string())),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Settings for one-shot quote lookups
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
    /// Backend used when none is named explicitly
    pub provider: QuoteProviderKind,
    pub finnhub_api_key: Option<String>,
    pub alphavantage_api_key: Option<String>,
    pub finnhub_base_url: String,
    pub alphavantage_base_url: String,
    /// Per-request timeout
    pub request_timeout_ms: u64,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            provider: QuoteProviderKind::default(),
            finnhub_api_key: None,
            alphavantage_api_key: None,
            finnhub_base_url: DEFAULT_FINNHUB_URL.to_string(),
            alphavantage_base_url: DEFAULT_ALPHAVANTAGE_URL.to_string(),
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for QuotesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuotesConfig")
            .field("provider", &self.provider)
            .field(
                "finnhub_api_key",
                &constants::redacted(self.finnhub_api_key.as_deref()),
            )
            .field(
                "alphavantage_api_key",
                &constants::redacted(self.alphavantage_api_key.as_deref()),
            )
            .field("finnhub_base_url", &self.finnhub_base_url)
            .field("alphavantage_base_url", &self.alphavantage_base_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl QuotesConfig {
    pub fn finnhub(&self) -> FinnhubConfig {
        FinnhubConfig {
            api_key: self.finnhub_api_key.clone(),
            base_url: self.finnhub_base_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }

    pub fn alphavantage(&self) -> AlphaVantageConfig {
        AlphaVantageConfig {
            api_key: self.alphavantage_api_key.clone(),
            base_url: self.alphavantage_base_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("finnhub".parse::<QuoteProviderKind>().unwrap(), QuoteProviderKind::Finnhub);
        assert_eq!(
            " AlphaVantage ".parse::<QuoteProviderKind>().unwrap(),
            QuoteProviderKind::AlphaVantage
        );
        assert_eq!(
            "alpha_vantage".parse::<QuoteProviderKind>().unwrap(),
            QuoteProviderKind::AlphaVantage
        );
        assert!(matches!(
            "yahoo".parse::<QuoteProviderKind>(),
            Err(QuoteError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_provider_kind_yaml_names() {
        let kind: QuoteProviderKind = serde_yaml::from_str("alphavantage").unwrap();
        assert_eq!(kind, QuoteProviderKind::AlphaVantage);
        assert_eq!(QuoteProviderKind::Finnhub.to_string(), "finnhub");
    }

    #[test]
    fn test_debug_hides_keys() {
        let config = QuotesConfig {
            finnhub_api_key: Some("fh-secret".to_string()),
            alphavantage_api_key: Some("av-secret".to_string()),
            ..QuotesConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("fh-secret"));
        assert!(!rendered.contains("av-secret"));
    }
}
