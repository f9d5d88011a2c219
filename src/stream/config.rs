//! Stream Configuration
//!
//! Endpoint, credential and reconnect timing for the live quote stream.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::constants::{self, valid_credential};

use super::errors::{StreamError, StreamResult};

// =============================================================================
// Constants
// =============================================================================

/// Finnhub real-time trades endpoint
pub const DEFAULT_WS_URL: &str = "wss://ws.finnhub.io";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the upstream trade stream
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// WebSocket endpoint, without the token parameter
    pub ws_url: String,
    /// Vendor API key; missing or placeholder keys disable streaming
    pub api_key: Option<String>,
    /// Fixed delay between a connection loss and the next attempt
    pub reconnect_delay_ms: u64,
    /// Random extra delay added to each reconnect (0 = constant interval)
    pub reconnect_jitter_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            api_key: None,
            reconnect_delay_ms: constants::DEFAULT_RECONNECT_DELAY_MS,
            reconnect_jitter_ms: constants::DEFAULT_RECONNECT_JITTER_MS,
        }
    }
}

impl fmt::Debug for StreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConfig")
            .field("ws_url", &self.ws_url)
            .field("api_key", &constants::redacted(self.api_key.as_deref()))
            .field("reconnect_delay_ms", &self.reconnect_delay_ms)
            .field("reconnect_jitter_ms", &self.reconnect_jitter_ms)
            .finish()
    }
}

impl StreamConfig {
    /// The API key, if it is present and not a placeholder
    pub fn credential(&self) -> Option<&str> {
        valid_credential(self.api_key.as_deref())
    }

    /// Full endpoint URL including the token query parameter
    pub fn connect_url(&self) -> StreamResult<String> {
        let key = self.credential().ok_or_else(|| {
            StreamError::NotConfigured("no valid streaming API key".to_string())
        })?;
        let url = reqwest::Url::parse_with_params(&self.ws_url, &[("token", key)])
            .map_err(|e| StreamError::InvalidUrl(format!("{}: {}", self.ws_url, e)))?;
        Ok(url.to_string())
    }

    /// Delay before the next connection attempt
    pub fn reconnect_delay(&self) -> Duration {
        let jitter = if self.reconnect_jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.reconnect_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.reconnect_delay_ms.saturating_add(jitter))
    }
}
