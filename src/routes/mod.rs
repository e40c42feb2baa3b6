//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the JSON API and the websocket feed under a single Axum router.
//! Every endpoint is CORS-open: the site is served from a static host and
//! calls this API cross-origin.

pub mod content;
pub mod feed;
pub mod messages;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::services::StorageError;
use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/send-message", post(messages::send_message))
        .route("/get-messages", get(messages::get_messages))
        .route("/clear-messages", delete(messages::clear_messages))
        .route("/get-theme", get(content::get_theme))
        .route("/generate-theme", post(content::generate_theme))
        .route("/lab-generate", post(content::lab_generate))
        .route("/generate-daily-content", post(content::generate_daily_content))
        .route("/verify-daily-content", get(content::verify_daily_content))
        .route("/get-config", get(content::get_config))
        .route("/feed", get(feed::handle_feed))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERROR RESPONSES
// =============================================================================

/// API failure: a status code plus a `{success: false, error}` body.
/// Upstream failures become 500s; the process never crashes on them.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "storage failure");
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "success": false, "error": self.message }));
        (self.status, body).into_response()
    }
}
