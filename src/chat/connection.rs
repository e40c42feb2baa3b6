//! Connection state machine for the chat feed.
//!
//! DESIGN
//! ======
//! Pure logic, no I/O. The driver reports what happened on the wire
//! (`socket_opened`, `socket_closed`, feed events, connectivity changes) and
//! the machine answers with a [`Directive`] telling it what to do next. All
//! timing policy — exponential backoff, offline suppression, immediate
//! reconnect when connectivity returns — lives here where it can be tested
//! without sockets or clocks.
//!
//! MESSAGE LIST
//! ============
//! The machine also owns the client's view of the message list. Feed inserts
//! are deduplicated by id: a message the client just sent comes back over the
//! feed, and the list must not show it twice. A `DELETE` event clears the
//! list only when it is non-empty, so the clear notice renders once rather
//! than once per connected tab echoing the event around.

use std::time::Duration;

use crate::state::{FeedEvent, MessageRecord};

/// Reconnect backoff: `base * 2^attempt`, capped.
const RECONNECT_BASE_MS: u64 = 1000;
const RECONNECT_MAX_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// What the driver should do after feeding an input to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Nothing to do.
    None,
    /// Open a new socket now.
    Connect,
    /// Wait this long, then open a new socket.
    ConnectAfter(Duration),
}

/// What changed in the message list after applying a feed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    /// Nothing changed (duplicate insert, or delete on an empty list).
    None,
    /// A new message was appended.
    Appended(MessageRecord),
    /// The list was cleared.
    Cleared,
}

pub struct ChatConnection {
    state: ConnectionState,
    attempt: u32,
    online: bool,
    messages: Vec<MessageRecord>,
}

impl Default for ChatConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatConnection {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempt: 0,
            online: true,
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn messages(&self) -> &[MessageRecord] {
        &self.messages
    }

    // ===== CONNECTION LIFECYCLE =====

    /// Initial connect requested by the view.
    pub fn connect_requested(&mut self) -> Directive {
        if !self.online {
            return Directive::None;
        }
        self.state = ConnectionState::Connecting;
        Directive::Connect
    }

    /// The socket opened successfully. Resets the backoff so the NEXT
    /// failure starts the delay ladder from the bottom again.
    pub fn socket_opened(&mut self) {
        self.state = ConnectionState::Connected;
        self.attempt = 0;
    }

    /// The socket closed or failed to open.
    pub fn socket_closed(&mut self) -> Directive {
        if !self.online {
            // No point dialing while offline; came_online retries instantly.
            self.state = ConnectionState::Disconnected;
            return Directive::None;
        }
        self.state = ConnectionState::Reconnecting;
        let delay = reconnect_delay(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        Directive::ConnectAfter(delay)
    }

    /// Connectivity lost. Suppresses reconnect attempts until it returns.
    pub fn went_offline(&mut self) {
        self.online = false;
        if self.state != ConnectionState::Connected {
            self.state = ConnectionState::Disconnected;
        }
    }

    /// Connectivity restored. If the feed is down, reconnect immediately
    /// with a fresh backoff rather than serving out a pending long delay.
    pub fn came_online(&mut self) -> Directive {
        self.online = true;
        match self.state {
            ConnectionState::Disconnected | ConnectionState::Reconnecting => {
                self.attempt = 0;
                self.state = ConnectionState::Connecting;
                Directive::Connect
            }
            ConnectionState::Connecting | ConnectionState::Connected => Directive::None,
        }
    }

    // ===== MESSAGE LIST =====

    /// Apply one feed event to the local message list.
    pub fn apply_event(&mut self, event: FeedEvent) -> ListChange {
        match event {
            FeedEvent::Insert { message } => {
                if self.messages.iter().any(|m| m.id == message.id) {
                    return ListChange::None;
                }
                self.messages.push(message.clone());
                ListChange::Appended(message)
            }
            FeedEvent::Delete { .. } => {
                if self.messages.is_empty() {
                    return ListChange::None;
                }
                self.messages.clear();
                ListChange::Cleared
            }
        }
    }

    /// Replace the list wholesale from a server fetch (initial load, polling
    /// fallback, or resync after coming back online).
    pub fn replace_messages(&mut self, messages: Vec<MessageRecord>) {
        self.messages = messages;
    }
}

/// Delay before reconnect attempt `attempt` (zero-based).
#[must_use]
pub fn reconnect_delay(attempt: u32) -> Duration {
    let multiplier = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let ms = RECONNECT_BASE_MS
        .saturating_mul(multiplier)
        .min(RECONNECT_MAX_MS);
    Duration::from_millis(ms)
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
