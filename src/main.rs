//! Quote Stream - Entry Point
//!
//! Orchestrates:
//! 1. Config + logging initialization
//! 2. QuoteStreamManager task
//! 3. Startup REST snapshot for configured symbols
//! 4. Live price subscriptions and notice logging
//! 5. Ctrl+C graceful shutdown

use std::path::Path;

use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use quote_stream::config::load_config_or_env;
use quote_stream::config::logging::init_logging;
use quote_stream::quotes::{create_provider, QuoteProvider};
use quote_stream::stream::{PriceCallback, QuoteStreamManager, StreamNotice};

/// Default configuration file (override with CONFIG_PATH)
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // =========================================================================
    // 1. Config + logging
    // =========================================================================
    dotenvy::dotenv().ok();
    init_logging();

    info!("=== Quote Stream ===");

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config_or_env(Path::new(&config_path))?;
    let symbols = config.normalized_symbols();

    info!(
        stream = ?config.stream,
        quotes = ?config.quotes,
        symbols = ?symbols,
        "Starting with configuration"
    );

    // =========================================================================
    // 2. Stream manager
    // =========================================================================
    let (handle, manager_task) = QuoteStreamManager::spawn(config.stream.clone());

    let mut notices = handle.notices();
    let notice_task = tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(StreamNotice::CredentialMissing) => {
                    warn!("Live prices unavailable: no streaming API key configured");
                }
                Ok(StreamNotice::ConnectionError(error)) => {
                    warn!(error = %error, "Live prices interrupted, reconnect scheduled");
                }
                Ok(StreamNotice::Reconnected) => info!("Live prices restored"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Notice receiver lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // =========================================================================
    // 3. Startup snapshot
    // =========================================================================
    let provider = create_provider(config.quotes.provider, &config.quotes);
    if provider.is_configured() {
        for symbol in &symbols {
            match provider.fetch_quote(symbol).await {
                Ok(quote) => info!(
                    provider = provider.provider_name(),
                    symbol = %quote.symbol,
                    price = quote.current_price,
                    previous_close = ?quote.previous_close,
                    "Snapshot quote"
                ),
                Err(e) => warn!(symbol = %symbol, error = %e, "Snapshot quote failed"),
            }
        }
    }

    // =========================================================================
    // 4. Live subscriptions
    // =========================================================================
    let log_price = PriceCallback::new(|price, symbol| {
        info!(symbol, price, "Price update");
    });
    for symbol in &symbols {
        handle.subscribe(symbol, log_price.clone())?;
    }
    if symbols.is_empty() {
        warn!("No symbols configured (set `symbols` in config.yaml or QUOTE_SYMBOLS)");
    }

    info!("Streaming. Press Ctrl+C to stop.");

    // =========================================================================
    // 5. Shutdown
    // =========================================================================
    signal::ctrl_c().await?;
    info!("[SHUTDOWN] Graceful shutdown initiated");

    handle.shutdown();
    manager_task.await?;
    notice_task.abort();

    info!("[SHUTDOWN] Clean exit");
    Ok(())
}
