//! Community chat client.
//!
//! DESIGN
//! ======
//! Split the same way the server splits transport from logic:
//! - [`connection`] is a pure state machine — reconnect backoff, offline
//!   handling, and message-list maintenance, with no I/O. Every decision it
//!   makes is unit-testable without a socket.
//! - [`client`] drives the machine over a real websocket, with an HTTP
//!   polling fallback when the feed cannot be reached.
//!
//! Nickname colors live here because both the server (default color on
//! insert) and the client (rendering) derive them the same way.

pub mod client;
pub mod connection;

pub use client::{ChatClient, ConnectivityEvent};
pub use connection::{ChatConnection, ConnectionState, Directive};

/// Colors chosen to stay distinct on a dark background.
const NICKNAME_COLORS: [&str; 20] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#f9ca24", "#6c5ce7", "#a55eea", "#26de81",
    "#fd79a8", "#fdcb6e", "#74b9ff", "#e17055", "#00b894", "#0984e3", "#e84393",
    "#00cec9", "#ffeaa7", "#fab1a0", "#81ecec", "#55a3ff", "#fd79a8",
];

/// Deterministic color for a nickname.
///
/// Hashes UTF-16 code units so the same nickname maps to the same palette
/// slot in the browser and here.
#[must_use]
pub fn nickname_color(nickname: &str) -> &'static str {
    let mut hash: i32 = 0;
    for unit in nickname.encode_utf16() {
        hash = i32::from(unit).wrapping_add((hash << 5).wrapping_sub(hash));
    }
    let index = hash.unsigned_abs() as usize % NICKNAME_COLORS.len();
    NICKNAME_COLORS[index]
}

#[cfg(test)]
mod tests {
    use super::nickname_color;

    #[test]
    fn color_is_deterministic() {
        assert_eq!(nickname_color("survivor42"), nickname_color("survivor42"));
    }

    #[test]
    fn color_comes_from_palette() {
        for name in ["a", "doomwatcher", "Ω-prepper", ""] {
            let color = nickname_color(name);
            assert!(super::NICKNAME_COLORS.contains(&color), "unexpected color {color}");
        }
    }

    #[test]
    fn empty_nickname_hashes_to_first_slot() {
        assert_eq!(nickname_color(""), super::NICKNAME_COLORS[0]);
    }
}
