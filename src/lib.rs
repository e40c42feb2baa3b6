//! Doomsday Countdown — countdown arithmetic, daily AI content, and a
//! community chat room over a Postgres-backed realtime change feed.
//!
//! SYSTEM CONTEXT
//! ==============
//! The binary serves the HTTP API and the websocket feed. The `chat` module
//! is the client half: a headless connection manager that consumes the feed
//! and can be embedded in any frontend.

pub mod chat;
pub mod content;
pub mod countdown;
pub mod db;
pub mod gemini;
pub mod routes;
pub mod services;
pub mod state;
