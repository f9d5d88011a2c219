//! WebSocket connection helpers
//!
//! TLS-enabled connect plus log-safe URL rendering.

use tokio_tungstenite::{
    connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream,
};

use super::errors::StreamError;

/// Type alias for the WebSocket stream with TLS
pub type TlsWebSocketStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Query parameters that carry credentials
const SECRET_PARAMS: [&str; 3] = ["token", "apikey", "api_key"];

/// Connect to a WebSocket endpoint with TLS (TLSv1.2 minimum)
///
/// Plain `ws://` URLs connect without TLS; the connector is only used for
/// `wss://`.
pub async fn connect_tls(url: &str) -> Result<TlsWebSocketStream, StreamError> {
    let tls = native_tls::TlsConnector::builder()
        .min_protocol_version(Some(native_tls::Protocol::Tlsv12))
        .build()
        .map_err(|e| StreamError::ConnectionFailed(format!("TLS error: {}", e)))?;

    let (ws_stream, _response) =
        connect_async_tls_with_config(url, None, false, Some(Connector::NativeTls(tls)))
            .await
            .map_err(|e| StreamError::WebSocket(Box::new(e)))?;

    Ok(ws_stream)
}

/// Render a URL for logs with credential parameters masked
pub fn redact_url(url: &str) -> String {
    let Ok(mut parsed) = reqwest::Url::parse(url) else {
        return "<invalid url>".to_string();
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let value = if SECRET_PARAMS.iter().any(|p| *p == k) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();

    if !pairs.is_empty() {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url_masks_token() {
        let redacted = redact_url("wss://ws.finnhub.io/?token=secret123");
        assert!(!redacted.contains("secret123"), "Got: {}", redacted);
        assert!(redacted.contains("token=***"), "Got: {}", redacted);
    }

    #[test]
    fn test_redact_url_keeps_other_params() {
        let redacted = redact_url("https://example.com/query?symbol=AAPL&apikey=k");
        assert!(redacted.contains("symbol=AAPL"), "Got: {}", redacted);
        assert!(!redacted.contains("apikey=k"), "Got: {}", redacted);
    }

    #[test]
    fn test_redact_url_invalid() {
        assert_eq!(redact_url("::nope::"), "<invalid url>");
    }

    #[tokio::test]
    async fn test_connect_refused_is_websocket_error() {
        // Port 1 on localhost is reserved and closed in test environments
        let result = connect_tls("ws://127.0.0.1:1").await;
        assert!(matches!(result, Err(StreamError::WebSocket(_))));
    }
}
