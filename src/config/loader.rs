//! Configuration loader for YAML files and environment overrides

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;
use crate::quotes::QuoteProviderKind;

use super::types::AppConfig;

/// Load configuration from a YAML file
///
/// This function:
/// 1. Checks if the file exists
/// 2. Parses the YAML content
/// 3. Validates the configuration rules
///
/// Environment overrides are not applied; see [`apply_env_overrides`].
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let config: AppConfig = serde_yaml::from_reader(reader).map_err(|e| {
        AppError::Config(format!("YAML parse error in '{}': {}", path.display(), e))
    })?;

    config.validate()?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing)
pub fn load_config_from_str(yaml_content: &str) -> Result<AppConfig, AppError> {
    let config: AppConfig = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::Config(format!("YAML parse error: {}", e)))?;

    config.validate()?;

    Ok(config)
}

/// Overlay environment variables on a loaded configuration
///
/// - `FINNHUB_API_KEY`: stream credential and Finnhub REST key
/// - `ALPHAVANTAGE_API_KEY`: Alpha Vantage REST key
/// - `QUOTE_PROVIDER`: `finnhub` or `alphavantage`
/// - `QUOTE_SYMBOLS`: comma-separated startup symbols
/// - `FINNHUB_WS_URL`, `FINNHUB_BASE_URL`, `ALPHAVANTAGE_BASE_URL`: endpoints
/// - `STREAM_RECONNECT_DELAY_MS`, `STREAM_RECONNECT_JITTER_MS`,
///   `QUOTE_REQUEST_TIMEOUT_MS`: timing
///
/// Unparseable values are an error, never silently replaced by defaults.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<(), AppError> {
    if let Ok(key) = std::env::var("FINNHUB_API_KEY") {
        config.stream.api_key = Some(key.clone());
        config.quotes.finnhub_api_key = Some(key);
    }
    if let Ok(key) = std::env::var("ALPHAVANTAGE_API_KEY") {
        config.quotes.alphavantage_api_key = Some(key);
    }
    if let Ok(url) = std::env::var("FINNHUB_WS_URL") {
        config.stream.ws_url = url;
    }
    if let Ok(url) = std::env::var("FINNHUB_BASE_URL") {
        config.quotes.finnhub_base_url = url;
    }
    if let Ok(url) = std::env::var("ALPHAVANTAGE_BASE_URL") {
        config.quotes.alphavantage_base_url = url;
    }
    if let Ok(name) = std::env::var("QUOTE_PROVIDER") {
        config.quotes.provider = name
            .parse::<QuoteProviderKind>()
            .map_err(|e| AppError::Config(format!("QUOTE_PROVIDER: {}", e)))?;
    }
    if let Ok(symbols) = std::env::var("QUOTE_SYMBOLS") {
        config.symbols = symbols
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(ms) = parse_env_u64("STREAM_RECONNECT_DELAY_MS")? {
        config.stream.reconnect_delay_ms = ms;
    }
    if let Some(ms) = parse_env_u64("STREAM_RECONNECT_JITTER_MS")? {
        config.stream.reconnect_jitter_ms = ms;
    }
    if let Some(ms) = parse_env_u64("QUOTE_REQUEST_TIMEOUT_MS")? {
        config.quotes.request_timeout_ms = ms;
    }

    config.validate()
}

fn parse_env_u64(name: &str) -> Result<Option<u64>, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} must be a whole number (got '{}')", name, raw))),
        Err(_) => Ok(None),
    }
}

/// Load `path` if it exists, otherwise start from defaults; then apply
/// environment overrides. Used by the binaries.
pub fn load_config_or_env(path: &Path) -> Result<AppConfig, AppError> {
    let mut config = if path.exists() {
        load_config(path)?
    } else {
        tracing::info!(path = %path.display(), "No configuration file, using defaults");
        AppConfig::default()
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

impl AppConfig {
    /// Defaults plus environment overrides, for running without a YAML file
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config)?;
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG_YAML: &str = r#"
stream:
  ws_url: wss://ws.finnhub.io
  reconnect_delay_ms: 2000
quotes:
  provider: alphavantage
  request_timeout_ms: 5000
symbols:
  - AAPL
  - msft
"#;

    const ENV_VARS: [&str; 10] = [
        "FINNHUB_API_KEY",
        "ALPHAVANTAGE_API_KEY",
        "FINNHUB_WS_URL",
        "FINNHUB_BASE_URL",
        "ALPHAVANTAGE_BASE_URL",
        "QUOTE_PROVIDER",
        "QUOTE_SYMBOLS",
        "STREAM_RECONNECT_DELAY_MS",
        "STREAM_RECONNECT_JITTER_MS",
        "QUOTE_REQUEST_TIMEOUT_MS",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str(VALID_CONFIG_YAML).unwrap();
        assert_eq!(config.stream.reconnect_delay_ms, 2000);
        // Unset fields keep their defaults
        assert_eq!(config.stream.reconnect_jitter_ms, 0);
        assert_eq!(config.quotes.provider, QuoteProviderKind::AlphaVantage);
        assert_eq!(config.quotes.request_timeout_ms, 5000);
        assert_eq!(config.normalized_symbols(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_load_config_from_str_empty_document() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.stream.reconnect_delay_ms, 5000);
    }

    #[test]
    fn test_load_config_from_str_invalid_yaml() {
        let result = load_config_from_str("invalid: yaml: content: [");
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    fn test_load_config_from_str_unknown_provider() {
        let result = load_config_from_str("quotes:\n  provider: yahoo\n");
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    fn test_load_config_from_str_validation_failure() {
        let yaml = "stream:\n  ws_url: http://ws.finnhub.io\n";
        let result = load_config_from_str(yaml);
        assert!(result.unwrap_err().to_string().contains("ws:// or wss://"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.yaml"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Configuration file not found"));
    }

    #[test]
    fn test_load_config_from_file_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID_CONFIG_YAML.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.symbols.len(), 2);
    }

    #[test]
    fn test_load_config_from_file_invalid_yaml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"invalid: [yaml: content").unwrap();
        temp_file.flush().unwrap();

        let result = load_config(temp_file.path());
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    #[serial(env)]
    fn test_env_overrides_yaml() {
        clear_env();
        std::env::set_var("FINNHUB_API_KEY", "fh-key");
        std::env::set_var("QUOTE_PROVIDER", "finnhub");
        std::env::set_var("QUOTE_SYMBOLS", "tsla, nvda,,");
        std::env::set_var("STREAM_RECONNECT_DELAY_MS", "750");

        let mut config = load_config_from_str(VALID_CONFIG_YAML).unwrap();
        apply_env_overrides(&mut config).unwrap();

        assert_eq!(config.stream.credential(), Some("fh-key"));
        assert_eq!(config.quotes.finnhub_api_key.as_deref(), Some("fh-key"));
        assert_eq!(config.quotes.provider, QuoteProviderKind::Finnhub);
        assert_eq!(config.normalized_symbols(), vec!["TSLA", "NVDA"]);
        assert_eq!(config.stream.reconnect_delay_ms, 750);

        clear_env();
    }

    #[test]
    #[serial(env)]
    fn test_env_override_rejects_garbage() {
        clear_env();
        std::env::set_var("STREAM_RECONNECT_DELAY_MS", "five seconds");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("STREAM_RECONNECT_DELAY_MS"), "Got: {}", err);

        clear_env();
        std::env::set_var("QUOTE_PROVIDER", "yahoo");
        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial(env)]
    fn test_env_overrides_endpoints_and_timing() {
        clear_env();
        std::env::set_var("FINNHUB_WS_URL", "ws://127.0.0.1:9001");
        std::env::set_var("ALPHAVANTAGE_BASE_URL", "http://127.0.0.1:9002");
        std::env::set_var("STREAM_RECONNECT_JITTER_MS", "250");
        std::env::set_var("QUOTE_REQUEST_TIMEOUT_MS", "1500");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.stream.ws_url, "ws://127.0.0.1:9001");
        assert_eq!(config.quotes.alphavantage_base_url, "http://127.0.0.1:9002");
        assert_eq!(config.stream.reconnect_jitter_ms, 250);
        assert_eq!(config.quotes.alphavantage().request_timeout_ms, 1500);

        // An endpoint with the wrong scheme fails validation
        std::env::set_var("FINNHUB_WS_URL", "https://ws.finnhub.io");
        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial(env)]
    fn test_load_config_or_env_missing_file() {
        clear_env();
        std::env::set_var("QUOTE_SYMBOLS", "AAPL");
        let config = load_config_or_env(Path::new("/nonexistent/config.yaml")).unwrap();
        assert_eq!(config.symbols, vec!["AAPL"]);
        clear_env();
    }

    #[test]
    #[serial(env)]
    fn test_from_env_without_variables() {
        clear_env();
        let config = AppConfig::from_env().unwrap();
        assert!(config.stream.credential().is_none());
        assert!(config.symbols.is_empty());
    }
}
