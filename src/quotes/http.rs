//! Shared HTTP client construction for quote providers

use std::time::Duration;

/// HTTP connection timeout (milliseconds)
const HTTP_CONNECT_TIMEOUT_MS: u64 = 3000;
/// Max idle connections per host in connection pool
const HTTP_POOL_MAX_IDLE: usize = 2;

/// Create an HTTP client with the provider's request timeout
pub fn create_http_client(provider: &str, timeout: Duration) -> reqwest::Client {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(provider, error = %e, "HTTP client build failed, using defaults");
            reqwest::Client::new()
        });
    tracing::debug!(
        provider,
        timeout_ms = timeout.as_millis() as u64,
        connect_timeout_ms = HTTP_CONNECT_TIMEOUT_MS,
        "HTTP client configured"
    );
    client
}

/// Base URL joined with a path, tolerating a trailing slash
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        assert_eq!(endpoint("https://finnhub.io/api/v1", "quote"), "https://finnhub.io/api/v1/quote");
        assert_eq!(endpoint("http://127.0.0.1:1234/", "/query"), "http://127.0.0.1:1234/query");
    }
}
