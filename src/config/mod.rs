//! Configuration module
//!
//! This module provides:
//! - Configuration types (`AppConfig`, with stream and quote sections)
//! - YAML loading plus environment overrides (`load_config`, `apply_env_overrides`)
//! - Application constants with environment variable overrides
//! - Logging initialization

pub mod constants;
mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{AppConfig, QuoteProviderKind, QuotesConfig, StreamConfig};

// Re-export loader functions
pub use loader::{apply_env_overrides, load_config, load_config_from_str, load_config_or_env};
