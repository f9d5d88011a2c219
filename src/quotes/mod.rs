//! One-shot REST quote lookups
//!
//! Interchangeable vendor backends normalized to a common [`Quote`].

pub mod alphavantage;
pub mod config;
pub mod errors;
pub mod factory;
pub mod finnhub;
pub mod http;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use alphavantage::{AlphaVantageConfig, AlphaVantageProvider};
pub use config::{QuoteProviderKind, QuotesConfig};
pub use errors::{QuoteError, QuoteResult};
pub use factory::{create_provider, create_provider_by_name, AnyProvider, SUPPORTED_PROVIDERS};
pub use finnhub::{FinnhubConfig, FinnhubProvider};
pub use traits::QuoteProvider;
pub use types::Quote;
