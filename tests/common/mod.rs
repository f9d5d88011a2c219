//! In-process trade stream server for integration tests
//!
//! Speaks the same JSON frames as the real endpoint so the manager can be
//! driven end to end over a real socket.

#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use quote_stream::stream::{PriceCallback, QuoteStreamHandle, StreamConfig};

/// Upper bound for anything a test waits on
pub const TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Mock Upstream
// =============================================================================

pub struct MockUpstream {
    listener: TcpListener,
    pub url: String,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        Self { listener, url }
    }

    /// Stream config pointing at this server with a usable key
    pub fn config(&self, reconnect_delay_ms: u64) -> StreamConfig {
        StreamConfig {
            ws_url: self.url.clone(),
            api_key: Some("test-key".to_string()),
            reconnect_delay_ms,
            reconnect_jitter_ms: 0,
        }
    }

    /// Accept the next client and complete the WebSocket handshake
    pub async fn accept(&self) -> MockConnection {
        let (tcp, _) = tokio::time::timeout(TIMEOUT, self.listener.accept())
            .await
            .expect("timed out waiting for client connection")
            .unwrap();
        let ws = accept_async(tcp).await.unwrap();
        MockConnection { ws }
    }

    /// Assert that no client connects within `window`
    pub async fn expect_no_connection(&self, window: Duration) {
        let result = tokio::time::timeout(window, self.listener.accept()).await;
        assert!(result.is_err(), "unexpected connection attempt");
    }
}

// =============================================================================
// Mock Connection
// =============================================================================

pub struct MockConnection {
    ws: WebSocketStream<TcpStream>,
}

impl MockConnection {
    /// Next JSON text frame from the client
    pub async fn recv_json(&mut self) -> Value {
        loop {
            let message = tokio::time::timeout(TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for client frame")
                .expect("client closed the connection")
                .unwrap();
            match message {
                Message::Text(text) => return serde_json::from_str(&text).unwrap(),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected frame from client: {:?}", other),
            }
        }
    }

    pub async fn send_json(&mut self, value: Value) {
        self.send_text(&value.to_string()).await;
    }

    pub async fn send_text(&mut self, text: &str) {
        self.ws.send(Message::Text(text.to_string())).await.unwrap();
    }

    pub async fn send_trade(&mut self, symbol: &str, price: f64) {
        self.send_json(serde_json::json!({
            "type": "trade",
            "data": [{"s": symbol, "p": price, "t": 1_700_000_000_000u64, "v": 1}]
        }))
        .await;
    }

    /// Close from the server side
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
        // Drain until the client acknowledges
        while let Ok(Some(Ok(_))) = tokio::time::timeout(TIMEOUT, self.ws.next()).await {}
    }

    /// Wait for the client to close the connection
    pub async fn expect_closed(mut self) {
        loop {
            match tokio::time::timeout(TIMEOUT, self.ws.next())
                .await
                .expect("client did not close the connection")
            {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                Some(Ok(_)) => continue,
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

pub fn subscribe_frame(symbol: &str) -> Value {
    serde_json::json!({"type": "subscribe", "symbol": symbol})
}

pub fn unsubscribe_frame(symbol: &str) -> Value {
    serde_json::json!({"type": "unsubscribe", "symbol": symbol})
}

/// Callback that forwards every delivery into a channel
pub fn recording_callback() -> (
    PriceCallback,
    tokio::sync::mpsc::UnboundedReceiver<(f64, String)>,
) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let callback = PriceCallback::new(move |price, symbol| {
        let _ = tx.send((price, symbol.to_string()));
    });
    (callback, rx)
}

pub async fn next_delivery(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<(f64, String)>,
) -> (f64, String) {
    tokio::time::timeout(TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for price delivery")
        .expect("callback dropped")
}

pub async fn wait_connected(handle: &QuoteStreamHandle, connected: bool) {
    let mut watch = handle.watch_connected();
    tokio::time::timeout(TIMEOUT, watch.wait_for(|c| *c == connected))
        .await
        .expect("timed out waiting for connection state")
        .unwrap();
}
