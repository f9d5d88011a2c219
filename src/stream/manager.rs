//! Live quote stream manager
//!
//! A single task owns the subscription registry and the upstream
//! connection. Consumers talk to it through a cloneable
//! [`QuoteStreamHandle`]; registry changes, upstream writes and callback
//! delivery all run sequentially on that task.
//!
//! Connection lifecycle:
//!   Disconnected -> Connecting -> Connected -> (error/close) -> Disconnected
//!   -> (after reconnect delay) -> Connecting -> ...
//!
//! Retries never stop while the manager runs. Without a usable credential
//! the manager stays Disconnected and only tracks subscriptions locally.

use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, trace, warn};

use super::config::StreamConfig;
use super::errors::{StreamError, StreamResult};
use super::registry::{SubscriptionRegistry, Transition};
use super::types::{
    normalize_symbol, ConnectionState, ControlFrame, InboundFrame, PriceCallback, StreamNotice,
    TradeEntry,
};
use super::websocket::{connect_tls, redact_url, TlsWebSocketStream};

type WsWriter = SplitSink<TlsWebSocketStream, Message>;

/// Notice broadcast capacity; slow observers only miss notices
const NOTICE_CHANNEL_CAPACITY: usize = 16;

// =============================================================================
// Commands
// =============================================================================

enum Command {
    Subscribe {
        symbol: String,
        callback: PriceCallback,
    },
    Unsubscribe {
        symbol: String,
        callback: PriceCallback,
    },
    SubscribedSymbols(oneshot::Sender<Vec<String>>),
    Shutdown,
}

enum Applied {
    /// Keep running; send the frame if the connection is open
    Continue(Option<ControlFrame>),
    Stop,
}

enum SessionEnd {
    Shutdown,
    Lost { error: Option<String> },
}

// =============================================================================
// QuoteStreamHandle
// =============================================================================

/// Consumer-side handle to a running [`QuoteStreamManager`]
#[derive(Clone, Debug)]
pub struct QuoteStreamHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    connected: watch::Receiver<bool>,
    notices: broadcast::Sender<StreamNotice>,
}

impl QuoteStreamHandle {
    /// Register `callback` for live prices of `symbol` (case-insensitive).
    pub fn subscribe(&self, symbol: &str, callback: PriceCallback) -> StreamResult<()> {
        self.send(Command::Subscribe {
            symbol: normalize_symbol(symbol),
            callback,
        })
    }

    /// Remove one registration of `callback` for `symbol`.
    pub fn unsubscribe(&self, symbol: &str, callback: &PriceCallback) -> StreamResult<()> {
        self.send(Command::Unsubscribe {
            symbol: normalize_symbol(symbol),
            callback: callback.clone(),
        })
    }

    /// True while the upstream connection is open
    pub fn connected(&self) -> bool {
        *self.connected.borrow()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Change notifications for the connected flag
    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// User-facing notices (missing credential, connection errors, recovery)
    pub fn notices(&self) -> broadcast::Receiver<StreamNotice> {
        self.notices.subscribe()
    }

    /// Symbols that currently have at least one subscriber
    pub async fn subscribed_symbols(&self) -> StreamResult<Vec<String>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::SubscribedSymbols(tx))?;
        rx.await.map_err(|_| StreamError::ManagerStopped)
    }

    /// Close the connection and stop the retry loop
    pub fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).is_err() {
            debug!("Shutdown requested but manager already stopped");
        }
    }

    fn send(&self, command: Command) -> StreamResult<()> {
        self.commands
            .send(command)
            .map_err(|_| StreamError::ManagerStopped)
    }
}

// =============================================================================
// QuoteStreamManager
// =============================================================================

/// Owns the registry and the single upstream connection
pub struct QuoteStreamManager {
    config: StreamConfig,
    registry: SubscriptionRegistry,
    commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<ConnectionState>,
    connected: watch::Sender<bool>,
    notices: broadcast::Sender<StreamNotice>,
}

impl QuoteStreamManager {
    /// Create a manager and its handle. Nothing runs until [`run`](Self::run)
    /// is awaited.
    pub fn new(config: StreamConfig) -> (Self, QuoteStreamHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (connected_tx, connected_rx) = watch::channel(false);
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);

        let handle = QuoteStreamHandle {
            commands: command_tx,
            state: state_rx,
            connected: connected_rx,
            notices: notice_tx.clone(),
        };
        let manager = Self {
            config,
            registry: SubscriptionRegistry::new(),
            commands: command_rx,
            state: state_tx,
            connected: connected_tx,
            notices: notice_tx,
        };
        (manager, handle)
    }

    /// Create a manager and run it on a new task
    pub fn spawn(config: StreamConfig) -> (QuoteStreamHandle, JoinHandle<()>) {
        let (manager, handle) = Self::new(config);
        (handle, tokio::spawn(manager.run()))
    }

    /// Run until shutdown is requested or every handle is dropped
    pub async fn run(mut self) {
        let url = match self.config.connect_url() {
            Ok(url) => url,
            Err(StreamError::NotConfigured(reason)) => {
                warn!(
                    reason = %reason,
                    "Live quotes disabled: set FINNHUB_API_KEY to enable streaming"
                );
                self.notify(StreamNotice::CredentialMissing);
                self.run_offline().await;
                return;
            }
            Err(e) => {
                error!(error = %e, "Live quotes disabled: stream endpoint is invalid");
                self.notify(StreamNotice::ConnectionError(e.to_string()));
                self.run_offline().await;
                return;
            }
        };

        info!(url = %redact_url(&url), "Quote stream manager started");
        let mut sessions: u64 = 0;

        loop {
            self.set_state(ConnectionState::Connecting);
            let Some(result) = self.connect(&url).await else {
                break;
            };

            match result {
                Ok(ws) => {
                    self.set_state(ConnectionState::Connected);
                    if sessions > 0 {
                        self.notify(StreamNotice::Reconnected);
                    }
                    sessions += 1;
                    info!(
                        symbols = self.registry.active_symbols().len(),
                        "Quote stream connected"
                    );

                    match self.run_session(ws).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Lost { error: Some(e) } => {
                            warn!(error = %e, "Quote stream connection lost");
                            self.notify(StreamNotice::ConnectionError(e));
                        }
                        SessionEnd::Lost { error: None } => {
                            info!("Quote stream closed by server");
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "Quote stream connection failed");
                    self.notify(StreamNotice::ConnectionError(e.to_string()));
                }
            }

            self.set_state(ConnectionState::Disconnected);
            let delay = self.config.reconnect_delay();
            info!(delay_ms = delay.as_millis() as u64, "Reconnecting after delay");
            if !self.wait(delay).await {
                break;
            }
        }

        self.set_state(ConnectionState::Disconnected);
        info!("Quote stream manager stopped");
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the connection while still serving commands. `None` on shutdown.
    async fn connect(&mut self, url: &str) -> Option<StreamResult<TlsWebSocketStream>> {
        let connecting = connect_tls(url);
        tokio::pin!(connecting);

        loop {
            tokio::select! {
                result = &mut connecting => return Some(result),
                command = self.commands.recv() => {
                    if !self.apply_offline(command) {
                        return None;
                    }
                }
            }
        }
    }

    /// Sleep out the reconnect delay. Returns false on shutdown.
    async fn wait(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                command = self.commands.recv() => {
                    if !self.apply_offline(command) {
                        return false;
                    }
                }
            }
        }
    }

    /// Serve commands with no connection, forever.
    async fn run_offline(&mut self) {
        loop {
            let command = self.commands.recv().await;
            if !self.apply_offline(command) {
                break;
            }
        }
        self.set_state(ConnectionState::Disconnected);
        info!("Quote stream manager stopped");
    }

    async fn run_session(&mut self, ws: TlsWebSocketStream) -> SessionEnd {
        let (mut writer, mut reader) = ws.split();

        // A new connection starts with no upstream subscriptions
        for symbol in self.registry.active_symbols() {
            if let Err(e) = send_frame(&mut writer, &ControlFrame::subscribe(&symbol)).await {
                return SessionEnd::Lost {
                    error: Some(e.to_string()),
                };
            }
            debug!(symbol = %symbol, "Subscription restored");
        }

        loop {
            tokio::select! {
                message = reader.next() => {
                    if let Some(end) = self.handle_message(message, &mut writer).await {
                        return end;
                    }
                }
                command = self.commands.recv() => match self.apply(command) {
                    Applied::Stop => {
                        let _ = writer.close().await;
                        return SessionEnd::Shutdown;
                    }
                    Applied::Continue(Some(frame)) => {
                        if let Err(e) = send_frame(&mut writer, &frame).await {
                            return SessionEnd::Lost {
                                error: Some(e.to_string()),
                            };
                        }
                        debug!(?frame, "Control frame sent");
                    }
                    Applied::Continue(None) => {}
                },
            }
        }
    }

    // =========================================================================
    // Inbound Frames
    // =========================================================================

    async fn handle_message(
        &self,
        message: Option<Result<Message, tungstenite::Error>>,
        writer: &mut WsWriter,
    ) -> Option<SessionEnd> {
        match message {
            Some(Ok(Message::Text(text))) => self.handle_text(&text, writer).await,
            Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                Ok(text) => self.handle_text(&text, writer).await,
                Err(_) => {
                    trace!("Ignoring non-UTF8 binary frame");
                    None
                }
            },
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "Close frame received");
                Some(SessionEnd::Lost { error: None })
            }
            // Protocol-level ping/pong is answered by tungstenite
            Some(Ok(_)) => None,
            Some(Err(e)) => Some(SessionEnd::Lost {
                error: Some(e.to_string()),
            }),
            None => Some(SessionEnd::Lost { error: None }),
        }
    }

    async fn handle_text(&self, text: &str, writer: &mut WsWriter) -> Option<SessionEnd> {
        match serde_json::from_str::<InboundFrame>(text) {
            Ok(InboundFrame::Ping {}) => {
                if let Err(e) = send_frame(writer, &ControlFrame::Pong).await {
                    return Some(SessionEnd::Lost {
                        error: Some(e.to_string()),
                    });
                }
                trace!("Pong sent");
            }
            Ok(InboundFrame::Trade { data }) => {
                for raw in data {
                    match TradeEntry::from_value(raw) {
                        Ok(entry) => {
                            self.registry.dispatch(&entry.to_update());
                        }
                        Err(e) => trace!(error = %e, "Skipping malformed trade entry"),
                    }
                }
            }
            Ok(InboundFrame::Error { msg }) => {
                warn!(message = %msg, "Upstream reported an error");
            }
            Err(e) => {
                trace!(error = %e, frame = %text, "Ignoring unrecognized frame");
            }
        }
        None
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn apply(&mut self, command: Option<Command>) -> Applied {
        match command {
            None | Some(Command::Shutdown) => Applied::Stop,
            Some(Command::Subscribe { symbol, callback }) => {
                match self.registry.add(&symbol, callback) {
                    Transition::Activated => {
                        debug!(symbol = %symbol, "First subscriber registered");
                        Applied::Continue(Some(ControlFrame::subscribe(&symbol)))
                    }
                    _ => Applied::Continue(None),
                }
            }
            Some(Command::Unsubscribe { symbol, callback }) => {
                match self.registry.remove(&symbol, &callback) {
                    Transition::Deactivated => {
                        debug!(symbol = %symbol, "Last subscriber removed");
                        Applied::Continue(Some(ControlFrame::unsubscribe(&symbol)))
                    }
                    _ => Applied::Continue(None),
                }
            }
            Some(Command::SubscribedSymbols(reply)) => {
                let _ = reply.send(self.registry.active_symbols());
                Applied::Continue(None)
            }
        }
    }

    /// Apply a command while no connection is open. Returns false on shutdown.
    fn apply_offline(&mut self, command: Option<Command>) -> bool {
        match self.apply(command) {
            Applied::Stop => false,
            Applied::Continue(Some(frame)) => {
                trace!(?frame, "Not connected, control frame skipped");
                true
            }
            Applied::Continue(None) => true,
        }
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Connection state changed");
        }
        let is_connected = state == ConnectionState::Connected;
        self.connected.send_if_modified(|current| {
            let changed = *current != is_connected;
            *current = is_connected;
            changed
        });
    }

    fn notify(&self, notice: StreamNotice) {
        // No receivers is fine
        let _ = self.notices.send(notice);
    }
}

async fn send_frame(writer: &mut WsWriter, frame: &ControlFrame) -> StreamResult<()> {
    let payload = serde_json::to_string(frame)?;
    writer.send(Message::Text(payload)).await?;
    Ok(())
}
