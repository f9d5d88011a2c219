//! Stream Types
//!
//! Wire frames exchanged with the upstream trade stream, plus the
//! consumer-facing types handed out by the manager.
//!
//! Wire format (JSON text frames):
//!   out: {"type":"subscribe","symbol":"AAPL"} / {"type":"unsubscribe",...} / {"type":"pong"}
//!   in:  {"type":"trade","data":[{"s":"AAPL","p":150.25,"t":1700000000000,"v":10}]}
//!        {"type":"ping"} / {"type":"error","msg":"..."}

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Normalize a ticker for registry lookups and upstream frames.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

// =============================================================================
// Outbound Control Frames
// =============================================================================

/// Control frame sent to the upstream endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlFrame {
    Subscribe { symbol: String },
    Unsubscribe { symbol: String },
    Pong,
}

impl ControlFrame {
    pub fn subscribe(symbol: &str) -> Self {
        ControlFrame::Subscribe {
            symbol: normalize_symbol(symbol),
        }
    }

    pub fn unsubscribe(symbol: &str) -> Self {
        ControlFrame::Unsubscribe {
            symbol: normalize_symbol(symbol),
        }
    }
}

// =============================================================================
// Inbound Frames
// =============================================================================

/// One realized trade inside a trade frame
#[derive(Debug, Clone, Deserialize)]
pub struct TradeEntry {
    /// Symbol
    pub s: String,
    /// Last price
    pub p: f64,
    /// Trade timestamp in milliseconds
    #[serde(default)]
    pub t: Option<u64>,
    /// Volume
    #[serde(default)]
    pub v: Option<f64>,
}

impl TradeEntry {
    /// Parse one element of a trade frame's `data` array
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn to_update(&self) -> PriceUpdate {
        PriceUpdate {
            symbol: normalize_symbol(&self.s),
            price: self.p,
            timestamp_ms: self.t,
            volume: self.v,
        }
    }
}

/// Frame received from the upstream endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    /// Entries are kept raw so one malformed trade does not drop the rest
    Trade {
        #[serde(default)]
        data: Vec<serde_json::Value>,
    },
    Ping {},
    Error {
        #[serde(default)]
        msg: String,
    },
}

// =============================================================================
// Consumer-facing Types
// =============================================================================

/// A single live price for a symbol
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub symbol: String,
    pub price: f64,
    pub timestamp_ms: Option<u64>,
    pub volume: Option<f64>,
}

/// Upstream connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// User-facing notice emitted by the manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamNotice {
    /// No usable credential: live prices are disabled for this process
    CredentialMissing,
    /// The connection failed; a reconnect is already scheduled
    ConnectionError(String),
    /// A connection was re-established after a loss
    Reconnected,
}

/// Shared price callback, invoked as `callback(price, symbol)`.
///
/// Clones share one allocation; two handles are the same callback if they
/// point at the same closure. Keep a clone to unsubscribe later.
#[derive(Clone)]
pub struct PriceCallback(Arc<dyn Fn(f64, &str) + Send + Sync>);

impl PriceCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64, &str) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, price: f64, symbol: &str) {
        (self.0)(price, symbol)
    }

    /// Pointer identity; vtables are ignored.
    pub fn same_as(&self, other: &PriceCallback) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl fmt::Debug for PriceCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PriceCallback({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}
