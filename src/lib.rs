//! Live market quotes
//!
//! - `stream`: one shared WebSocket trade stream multiplexed across
//!   per-symbol price callbacks, reconnecting forever
//! - `quotes`: one-shot REST lookups via Finnhub or Alpha Vantage
//! - `config`: YAML + environment configuration and logging setup

pub mod config;
pub mod error;
pub mod quotes;
pub mod stream;

pub use error::AppError;
