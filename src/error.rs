//! Application-wide error types using thiserror
//!
//! Layer errors (`StreamError`, `QuoteError`) convert into AppError so
//! binaries can propagate everything with `?`.

use thiserror::Error;

use crate::quotes::QuoteError;
use crate::stream::StreamError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
