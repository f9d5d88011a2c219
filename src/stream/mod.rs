//! Live quote streaming
//!
//! One shared WebSocket connection to the trade stream, multiplexed across
//! any number of per-symbol price callbacks, with a reconnect-forever loop.

pub mod config;
pub mod errors;
pub mod manager;
pub mod registry;
pub mod types;
pub mod websocket;

// Re-export commonly used types for convenience
pub use config::StreamConfig;
pub use errors::{StreamError, StreamResult};
pub use manager::{QuoteStreamHandle, QuoteStreamManager};
pub use registry::{SubscriptionRegistry, Transition};
pub use types::{
    normalize_symbol, ConnectionState, ControlFrame, InboundFrame, PriceCallback, PriceUpdate,
    StreamNotice, TradeEntry,
};
pub use websocket::{connect_tls, redact_url};
