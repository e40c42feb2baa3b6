//! Websocket driver for the chat connection.
//!
//! DESIGN
//! ======
//! Owns the I/O side of [`ChatConnection`]: fetches the feed URL from
//! `/get-config`, dials the websocket, pumps feed events into the state
//! machine, and executes whatever [`Directive`] it returns. View updates
//! flow out over an unbounded channel so the rendering side never blocks
//! the network loop.
//!
//! If the feed configuration cannot be fetched at all, the client degrades
//! to polling `/get-messages` on a fixed interval. Sending is always plain
//! HTTP: the sent message is NOT echoed locally — it arrives back over the
//! feed like everyone else's, which keeps ordering identical across clients.
//!
//! The embedder reports network availability through the sender returned by
//! [`ChatClient::connectivity`]. While offline the loop parks instead of
//! redialing; an `Online` signal reconnects immediately with fresh backoff.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{info, warn};

use super::connection::{ChatConnection, ConnectionState, Directive, ListChange};
use crate::state::MessageRecord;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket failed: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("server rejected request: {0}")]
    Server(String),
}

/// Network availability report from the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

/// Update pushed to the rendering side.
#[derive(Debug, Clone)]
pub enum ChatUpdate {
    /// Full replacement of the message list.
    Snapshot(Vec<MessageRecord>),
    /// One new message appended.
    Message(MessageRecord),
    /// The list was cleared server-side.
    Cleared,
    /// Connection status changed.
    Status(ConnectionState),
}

pub struct ChatClient {
    api_base: String,
    nickname: String,
    http: reqwest::Client,
    conn: ChatConnection,
    updates: mpsc::UnboundedSender<ChatUpdate>,
    connectivity_tx: mpsc::UnboundedSender<ConnectivityEvent>,
    connectivity_rx: mpsc::UnboundedReceiver<ConnectivityEvent>,
}

impl ChatClient {
    /// Build a client against `api_base` (e.g. `http://localhost:3000`).
    /// Returns the client and the receiving end of the view-update stream.
    #[must_use]
    pub fn new(api_base: impl Into<String>, nickname: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<ChatUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let (connectivity_tx, connectivity_rx) = mpsc::unbounded_channel();
        let client = Self {
            api_base: api_base.into(),
            nickname: nickname.into(),
            http: reqwest::Client::new(),
            conn: ChatConnection::new(),
            updates,
            connectivity_tx,
            connectivity_rx,
        };
        (client, rx)
    }

    /// Connectivity input for the embedder. Send `Offline` when the network
    /// drops and `Online` when it returns; while offline the run loop parks
    /// instead of redialing a dead network.
    #[must_use]
    pub fn connectivity(&self) -> mpsc::UnboundedSender<ConnectivityEvent> {
        self.connectivity_tx.clone()
    }

    /// Send a message. The stored record is returned, but not pushed into
    /// the local list — it arrives over the feed.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] if the request fails or the server rejects it.
    pub async fn send_message(&self, text: &str) -> Result<MessageRecord, ChatError> {
        let body = serde_json::json!({ "nickname": self.nickname, "text": text });
        let response: serde_json::Value = self
            .http
            .post(format!("{}/send-message", self.api_base))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if response["success"].as_bool() != Some(true) {
            let error = response["error"].as_str().unwrap_or("unknown error").to_string();
            return Err(ChatError::Server(error));
        }
        serde_json::from_value(response["message"].clone())
            .map_err(|e| ChatError::Server(format!("malformed message in response: {e}")))
    }

    /// Run the connection loop. Returns only when the view-update channel
    /// closes (the rendering side went away).
    pub async fn run(mut self) {
        // Initial history load, so the view has something before the feed
        // delivers its first event.
        match self.fetch_messages().await {
            Ok(messages) => {
                self.conn.replace_messages(messages.clone());
                let _ = self.updates.send(ChatUpdate::Snapshot(messages));
            }
            Err(e) => warn!(error = %e, "chat: initial message fetch failed"),
        }

        let feed_url = match self.fetch_feed_url().await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "chat: feed config unavailable, polling instead");
                self.run_polling().await;
                return;
            }
        };

        let mut directive = self.conn.connect_requested();
        loop {
            match directive {
                Directive::Connect => {}
                Directive::ConnectAfter(delay) => {
                    if let Some(next) = self.wait_or_signal(delay).await {
                        directive = next;
                        continue;
                    }
                }
                Directive::None => {
                    // Offline with no socket: park until connectivity returns.
                    match self.await_online().await {
                        Some(next) => {
                            directive = next;
                            continue;
                        }
                        None => return,
                    }
                }
            }

            match self.run_socket(&feed_url).await {
                Ok(()) => info!("chat: feed closed cleanly"),
                Err(e) => warn!(error = %e, "chat: feed connection failed"),
            }

            if self.updates.is_closed() {
                return;
            }
            directive = self.conn.socket_closed();
            let _ = self.updates.send(ChatUpdate::Status(self.conn.state()));
        }
    }

    // ===== CONNECTIVITY SIGNALS =====

    /// Wait while offline. Returns the reconnect directive once an `Online`
    /// signal arrives, or `None` when the rendering side went away and the
    /// loop should end.
    async fn await_online(&mut self) -> Option<Directive> {
        loop {
            tokio::select! {
                event = self.connectivity_rx.recv() => {
                    match event {
                        Some(ConnectivityEvent::Online) => {
                            let directive = self.conn.came_online();
                            if directive != Directive::None {
                                let _ = self.updates.send(ChatUpdate::Status(self.conn.state()));
                                return Some(directive);
                            }
                        }
                        Some(ConnectivityEvent::Offline) => self.conn.went_offline(),
                        None => return None,
                    }
                }
                () = self.updates.closed() => return None,
            }
        }
    }

    /// Sit out a reconnect delay, letting connectivity signals cut it short.
    /// `None` means the delay elapsed and the pending connect should proceed;
    /// `Some(directive)` replaces it.
    async fn wait_or_signal(&mut self, delay: Duration) -> Option<Directive> {
        let sleeper = tokio::time::sleep(delay);
        tokio::pin!(sleeper);
        loop {
            tokio::select! {
                () = &mut sleeper => return None,
                event = self.connectivity_rx.recv() => {
                    match event {
                        Some(ConnectivityEvent::Online) => {
                            // Fresh backoff beats serving out a long delay.
                            let directive = self.conn.came_online();
                            if directive != Directive::None {
                                return Some(directive);
                            }
                        }
                        Some(ConnectivityEvent::Offline) => {
                            self.conn.went_offline();
                            return Some(Directive::None);
                        }
                        None => {}
                    }
                }
            }
        }
    }

    // ===== FEED CONNECTION =====

    async fn run_socket(&mut self, feed_url: &str) -> Result<(), ChatError> {
        let (mut socket, _) = connect_async(feed_url).await?;
        self.conn.socket_opened();
        let _ = self.updates.send(ChatUpdate::Status(ConnectionState::Connected));
        info!("chat: feed connected");

        // Resync: inserts that happened while disconnected never replay.
        if let Ok(messages) = self.fetch_messages().await {
            self.conn.replace_messages(messages.clone());
            let _ = self.updates.send(ChatUpdate::Snapshot(messages));
        }

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await; // immediate first tick is not a heartbeat

        loop {
            tokio::select! {
                msg = socket.next() => {
                    match msg {
                        Some(Ok(WsMessage::Text(text))) => self.handle_feed_text(&text),
                        Some(Ok(WsMessage::Close(_))) | None => return Ok(()),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                    }
                }
                _ = heartbeat.tick() => {
                    socket.send(WsMessage::Ping(Vec::new().into())).await?;
                }
                event = self.connectivity_rx.recv() => {
                    match event {
                        Some(ConnectivityEvent::Offline) => {
                            // Drop the socket now. socket_closed() sees the
                            // offline flag and parks instead of redialing.
                            self.conn.went_offline();
                            let _ = socket.close(None).await;
                            return Ok(());
                        }
                        // Already connected; nothing to redial.
                        Some(ConnectivityEvent::Online) | None => {}
                    }
                }
            }
        }
    }

    fn handle_feed_text(&mut self, text: &str) {
        let event = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "chat: unparseable feed event");
                return;
            }
        };
        match self.conn.apply_event(event) {
            ListChange::Appended(message) => {
                let _ = self.updates.send(ChatUpdate::Message(message));
            }
            ListChange::Cleared => {
                let _ = self.updates.send(ChatUpdate::Cleared);
            }
            ListChange::None => {}
        }
    }

    // ===== POLLING FALLBACK =====

    async fn run_polling(&mut self) {
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        loop {
            interval.tick().await;
            if self.updates.is_closed() {
                return;
            }
            match self.fetch_messages().await {
                Ok(messages) => {
                    if messages.len() != self.conn.messages().len() {
                        self.conn.replace_messages(messages.clone());
                        let _ = self.updates.send(ChatUpdate::Snapshot(messages));
                    }
                }
                Err(e) => warn!(error = %e, "chat: poll failed"),
            }
        }
    }

    // ===== HTTP HELPERS =====

    async fn fetch_feed_url(&self) -> Result<String, ChatError> {
        let config: serde_json::Value = self
            .http
            .get(format!("{}/get-config", self.api_base))
            .send()
            .await?
            .json()
            .await?;
        config["feedUrl"]
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| ChatError::Server("config response missing feedUrl".into()))
    }

    async fn fetch_messages(&self) -> Result<Vec<MessageRecord>, ChatError> {
        let response: serde_json::Value = self
            .http
            .get(format!("{}/get-messages", self.api_base))
            .send()
            .await?
            .json()
            .await?;
        serde_json::from_value(response["messages"].clone())
            .map_err(|e| ChatError::Server(format!("malformed message list: {e}")))
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
