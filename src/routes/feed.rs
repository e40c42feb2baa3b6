//! WebSocket feed — outbound change notifications.
//!
//! DESIGN
//! ======
//! On upgrade, the connection subscribes to the shared broadcast channel and
//! enters a `select!` loop: feed events are serialized and pushed to the
//! client; inbound messages are ignored except for Close. The feed is
//! strictly one-way — clients mutate through the HTTP endpoints, and every
//! committed mutation arrives here as an `INSERT` or `DELETE` event.
//!
//! A slow client that falls behind the channel (`Lagged`) skips the missed
//! events and keeps receiving from the current position. Chat clients
//! tolerate gaps: a missed insert surfaces on the next full fetch.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

pub async fn handle_feed(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_feed(socket, state))
}

async fn run_feed(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let mut events = state.feed.subscribe();

    info!(%client_id, "feed: client connected");

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!(%client_id, error = %e, "feed: failed to serialize event");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%client_id, skipped, "feed: client lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Inbound text/ping is ignored: the feed is one-way.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    info!(%client_id, "feed: client disconnected");
}
