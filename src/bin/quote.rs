//! One-shot quote lookup
//!
//! Usage: `quote SYMBOL [finnhub|alphavantage]`
//!
//! Prints the normalized quote as JSON. The provider defaults to
//! `QUOTE_PROVIDER` / config.yaml, then Finnhub.

use std::path::Path;

use anyhow::Context;

use quote_stream::config::load_config_or_env;
use quote_stream::config::logging::init_logging;
use quote_stream::quotes::{create_provider, create_provider_by_name, QuoteProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let mut args = std::env::args().skip(1);
    let symbol = args
        .next()
        .context("usage: quote SYMBOL [finnhub|alphavantage]")?;

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    let config = load_config_or_env(Path::new(&config_path))?;

    let provider = match args.next() {
        Some(name) => create_provider_by_name(&name, &config.quotes)?,
        None => create_provider(config.quotes.provider, &config.quotes),
    };

    let quote = provider
        .fetch_quote(&symbol)
        .await
        .with_context(|| format!("{} lookup for {} failed", provider.provider_name(), symbol))?;

    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}
