//! Stream error types
//!
//! All live-stream failures are wrapped in StreamError. None of them reach
//! price subscribers: the manager recovers from transport errors itself.

use thiserror::Error;

/// Error types for the live quote stream
#[derive(Error, Debug)]
pub enum StreamError {
    /// No usable streaming credential is configured
    #[error("Streaming not configured: {0}")]
    NotConfigured(String),

    /// Connection to the upstream endpoint failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Endpoint URL could not be built
    #[error("Invalid stream URL: {0}")]
    InvalidUrl(String),

    /// WebSocket protocol error (boxed to reduce enum size)
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// Control frame could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The manager task is no longer running
    #[error("Quote stream manager has stopped")]
    ManagerStopped,
}

impl From<tokio_tungstenite::tungstenite::Error> for StreamError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        StreamError::WebSocket(Box::new(err))
    }
}

/// Result type alias for stream operations
pub type StreamResult<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_display() {
        let err = StreamError::NotConfigured("FINNHUB_API_KEY is missing".to_string());
        assert_eq!(
            err.to_string(),
            "Streaming not configured: FINNHUB_API_KEY is missing"
        );
    }

    #[test]
    fn test_connection_failed_display() {
        let err = StreamError::ConnectionFailed("refused".to_string());
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn test_tungstenite_error_converts() {
        let err: StreamError = tokio_tungstenite::tungstenite::Error::ConnectionClosed.into();
        assert!(matches!(err, StreamError::WebSocket(_)));
        assert!(err.to_string().starts_with("WebSocket error"));
    }

    #[test]
    fn test_manager_stopped_display() {
        assert_eq!(
            StreamError::ManagerStopped.to_string(),
            "Quote stream manager has stopped"
        );
    }
}
