//! Provider factory for runtime backend selection
//!
//! Uses an enum-based dispatch pattern (no `Box<dyn>`).

use async_trait::async_trait;

use super::alphavantage::AlphaVantageProvider;
use super::config::{QuoteProviderKind, QuotesConfig};
use super::errors::QuoteResult;
use super::finnhub::FinnhubProvider;
use super::traits::QuoteProvider;
use super::types::Quote;

// =============================================================================
// AnyProvider
// =============================================================================

/// Enum wrapping every concrete provider for runtime dispatch.
pub enum AnyProvider {
    Finnhub(FinnhubProvider),
    AlphaVantage(AlphaVantageProvider),
}

macro_rules! delegate {
    ($self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            AnyProvider::Finnhub(p) => p.$method($($arg),*),
            AnyProvider::AlphaVantage(p) => p.$method($($arg),*),
        }
    };
    (await $self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            AnyProvider::Finnhub(p) => p.$method($($arg),*).await,
            AnyProvider::AlphaVantage(p) => p.$method($($arg),*).await,
        }
    };
}

#[async_trait]
impl QuoteProvider for AnyProvider {
    async fn fetch_quote(&self, symbol: &str) -> QuoteResult<Quote> {
        delegate!(await self, fetch_quote(symbol))
    }

    fn provider_name(&self) -> &'static str {
        delegate!(self, provider_name())
    }

    fn is_configured(&self) -> bool {
        delegate!(self, is_configured())
    }
}

// =============================================================================
// Factory Functions
// =============================================================================

/// All supported provider names.
pub const SUPPORTED_PROVIDERS: &[&str] = &["finnhub", "alphavantage"];

/// Create the provider of the given kind from shared settings.
pub fn create_provider(kind: QuoteProviderKind, config: &QuotesConfig) -> AnyProvider {
    let provider = match kind {
        QuoteProviderKind::Finnhub => AnyProvider::Finnhub(FinnhubProvider::new(config.finnhub())),
        QuoteProviderKind::AlphaVantage => {
            AnyProvider::AlphaVantage(AlphaVantageProvider::new(config.alphavantage()))
        }
    };
    if !provider.is_configured() {
        tracing::warn!(
            provider = provider.provider_name(),
            "Quote provider has no API key, lookups will fail"
        );
    }
    provider
}

/// Create a provider from a config name string (`finnhub`, `alphavantage`).
pub fn create_provider_by_name(name: &str, config: &QuotesConfig) -> QuoteResult<AnyProvider> {
    let kind: QuoteProviderKind = name.parse()?;
    Ok(create_provider(kind, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::QuoteError;

    #[test]
    fn test_create_provider_by_name() {
        let config = QuotesConfig::default();
        for name in SUPPORTED_PROVIDERS {
            let provider = create_provider_by_name(name, &config).unwrap();
            assert_eq!(provider.provider_name(), *name);
            assert!(!provider.is_configured());
        }
        assert!(matches!(
            create_provider_by_name("yahoo", &config),
            Err(QuoteError::UnknownProvider(_))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_reaches_selected_backend() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/query")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"Global Quote":{"05. price":"10.5000"}}"#)
            .create_async()
            .await;

        let config = QuotesConfig {
            alphavantage_api_key: Some("av-key".to_string()),
            alphavantage_base_url: server.url(),
            ..QuotesConfig::default()
        };
        let provider = create_provider(QuoteProviderKind::AlphaVantage, &config);
        let quote = provider.fetch_quote("xyz").await.unwrap();
        assert_eq!(quote.symbol, "XYZ");
        assert_eq!(quote.current_price, 10.5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unconfigured_credential_is_config_error() {
        let config = QuotesConfig::default();
        for kind in [QuoteProviderKind::Finnhub, QuoteProviderKind::AlphaVantage] {
            let result = create_provider(kind, &config).fetch_quote("AAPL").await;
            assert!(matches!(result, Err(QuoteError::NotConfigured { .. })));
        }
    }
}
