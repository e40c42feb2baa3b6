//! Message endpoints — send, list, bulk clear.

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use tracing::info;

use super::ApiError;
use crate::chat::nickname_color;
use crate::services::message;
use crate::state::{AppState, FeedEvent};

#[derive(Deserialize)]
pub struct SendMessageBody {
    pub nickname: String,
    pub text: String,
    pub color: Option<String>,
}

/// `POST /send-message` — validate, insert, publish on the feed.
///
/// The sender's own view updates through the feed echo, not this response;
/// the record is returned for confirmation only.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let nickname = body.nickname.trim();
    let text = body.text.trim();
    if nickname.is_empty() {
        return Err(ApiError::bad_request("Nickname is required"));
    }
    if text.is_empty() {
        return Err(ApiError::bad_request("Message text is required"));
    }

    let color = body
        .color
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map_or_else(|| nickname_color(nickname).to_string(), str::to_string);

    let record = message::insert_message(&state.pool, nickname, text, &color).await?;
    info!(id = record.id, nickname, "message stored");

    state.publish(FeedEvent::Insert { message: record.clone() });

    Ok(Json(serde_json::json!({ "success": true, "message": record })))
}

/// `GET /get-messages` — every message, ascending by creation time.
pub async fn get_messages(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let messages = message::list_messages(&state.pool).await?;
    Ok(Json(serde_json::json!({ "success": true, "messages": messages })))
}

/// `DELETE /clear-messages` — remove every message and announce the clear.
pub async fn clear_messages(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted_count = message::delete_all_messages(&state.pool).await?;
    info!(deleted_count, "messages cleared");

    state.publish(FeedEvent::Delete { deleted_count });

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Cleared {deleted_count} messages from database"),
        "deletedCount": deleted_count,
    })))
}

#[cfg(test)]
#[path = "messages_test.rs"]
mod tests;
