//! Content endpoints — theme reads, on-demand generation, and the lab.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use rand::Rng;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{error, info};

use super::ApiError;
use crate::content;
use crate::countdown::{self, START_DATE, TOTAL_DAYS};
use crate::gemini::{types, GenerationRequest, GeminiError};
use crate::services::daily::{self, GeneratedField};
use crate::state::AppState;

/// Theme shown when no content has ever been generated.
const DEFAULT_THEME: &str = "How do you find meaning when everything feels uncertain?";

// =============================================================================
// GET /get-theme
// =============================================================================

/// `GET /get-theme` — latest daily content, or the static default.
///
/// Absence of content is not an error: the response always carries a
/// displayable theme, with `from_database` telling the caller which it got.
pub async fn get_theme(State(state): State<AppState>) -> Response {
    match daily::get_latest_daily_content(&state.pool).await {
        Ok(Some(entry)) => Json(serde_json::json!({
            "success": true,
            "theme": entry.chat_theme.clone().unwrap_or_else(|| DEFAULT_THEME.to_string()),
            "quote": entry.main_quote,
            "news": entry.daily_news,
            "day_number": entry.day_number,
            "from_database": true,
        }))
        .into_response(),
        Ok(None) => Json(serde_json::json!({
            "success": true,
            "theme": DEFAULT_THEME,
            "day_number": 1,
            "from_database": false,
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "get-theme query failed");
            // Even the error body carries a usable fallback theme.
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                    "theme": DEFAULT_THEME,
                    "from_database": false,
                })),
            )
                .into_response()
        }
    }
}

// =============================================================================
// POST /generate-theme
// =============================================================================

#[derive(Deserialize, Default)]
pub struct GenerateThemeBody {
    /// `"theme"` (default) or `"news"`.
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

/// `POST /generate-theme` — generate a discussion question or headline on
/// demand and store it into today's row.
pub async fn generate_theme(
    State(state): State<AppState>,
    body: Option<Json<GenerateThemeBody>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| ApiError::internal("Missing GEMINI_API_KEY environment variable"))?;

    let content_type = body
        .and_then(|Json(b)| b.content_type)
        .unwrap_or_else(|| "theme".to_string());

    let (prompt, field) = match content_type.as_str() {
        "news" => {
            let topic = random_pick(content::NEWS_TOPICS);
            (content::headline_prompt(topic), GeneratedField::DailyNews)
        }
        _ => {
            let theme = random_pick(content::CHAT_THEMES);
            (content::discussion_prompt(theme), GeneratedField::ChatTheme)
        }
    };

    let generated = ai
        .generate(&GenerationRequest::with_defaults(prompt))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let now = OffsetDateTime::now_utc();
    let day = countdown::current_day_number(now, START_DATE, TOTAL_DAYS);
    let day_number = i32::try_from(day).unwrap_or(i32::MAX);

    let entry = daily::upsert_generated_field(&state.pool, day_number, now.date(), field, &generated).await?;
    info!(day_number, field = field.column(), "on-demand content stored");

    Ok(Json(serde_json::json!({
        "success": true,
        "content": entry,
        "type": if field == GeneratedField::DailyNews { "news" } else { "theme" },
        "field": field.column(),
    })))
}

fn random_pick<'a>(list: &[&'a str]) -> &'a str {
    let index = rand::rng().random_range(0..list.len());
    list[index]
}

// =============================================================================
// POST /lab-generate
// =============================================================================

#[derive(Deserialize)]
pub struct LabGenerateBody {
    pub prompt: String,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    #[serde(rename = "maxTokens")]
    pub max_tokens: Option<u32>,
}

/// `POST /lab-generate` — interactive generation with caller-chosen tuning.
///
/// Deliberately does NOT retry on 429: the lab surfaces rate limiting to the
/// experimenter immediately instead of silently stalling.
pub async fn lab_generate(State(state): State<AppState>, Json(body): Json<LabGenerateBody>) -> Response {
    let Some(ai) = state.ai.as_ref() else {
        return lab_error(
            &GeminiError::MissingApiKey { var: "GEMINI_API_KEY".into() },
            &body,
        );
    };

    let request = GenerationRequest {
        prompt: body.prompt.clone(),
        model: body.model.clone().unwrap_or_else(|| types::DEFAULT_MODEL.to_string()),
        temperature: body.temperature.unwrap_or(types::DEFAULT_TEMPERATURE),
        max_tokens: body.max_tokens.unwrap_or(types::DEFAULT_MAX_TOKENS),
    };

    let started = Instant::now();
    match ai.generate(&request).await {
        Ok(text) => {
            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            info!(
                model = %request.model,
                duration_ms,
                response_len = text.len(),
                "lab generation succeeded"
            );
            Json(serde_json::json!({
                "success": true,
                "text": text,
                "metadata": {
                    "model": request.model,
                    "temperature": request.temperature,
                    "maxTokens": request.max_tokens,
                    "promptLength": request.prompt.len(),
                    "responseLength": text.len(),
                },
            }))
            .into_response()
        }
        Err(e) => lab_error(&e, &body),
    }
}

fn lab_error(err: &GeminiError, body: &LabGenerateBody) -> Response {
    error!(error = %err, category = err.category(), "lab generation failed");

    let status = if matches!(err, GeminiError::InvalidArgument(_)) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let prompt_preview: String = body.prompt.chars().take(100).collect();

    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "errorCategory": err.category(),
            "details": {
                "prompt": prompt_preview,
                "model": body.model.as_deref().unwrap_or(types::DEFAULT_MODEL),
                "temperature": body.temperature.unwrap_or(types::DEFAULT_TEMPERATURE),
                "maxTokens": body.max_tokens.unwrap_or(types::DEFAULT_MAX_TOKENS),
                "suggestion": err.suggestion(),
            },
        })),
    )
        .into_response()
}

// =============================================================================
// DAILY JOB TRIGGER + VERIFICATION
// =============================================================================

/// `POST /generate-daily-content` — run the daily job now. Idempotent: an
/// existing row for today short-circuits.
pub async fn generate_daily_content(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| ApiError::internal("Missing GEMINI_API_KEY environment variable"))?;

    let outcome = daily::generate_for_today(&state.pool, ai.as_ref()).await?;
    let (message, entry) = match &outcome {
        daily::DailyJobOutcome::AlreadyExists(entry) => {
            (format!("Content already exists for day {}", entry.day_number), entry)
        }
        daily::DailyJobOutcome::Generated(entry) => {
            (format!("Generated fresh content for day {}", entry.day_number), entry)
        }
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "message": message,
        "dayNumber": entry.day_number,
        "content": entry,
    })))
}

/// `GET /verify-daily-content` — health report for the daily content system.
pub async fn verify_daily_content(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let report = daily::verification_report(&state.pool).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "env": {
            "gemini_key": state.ai.is_some(),
        },
        "report": report,
    })))
}

// =============================================================================
// GET /get-config
// =============================================================================

/// `GET /get-config` — connection details for the realtime feed. Carries
/// only anon-scoped information; credentials never leave the server.
pub async fn get_config() -> Json<serde_json::Value> {
    let base = std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    Json(serde_json::json!({
        "success": true,
        "feedUrl": feed_url_from_base(&base),
    }))
}

/// Rewrite the HTTP base URL into the websocket feed URL.
fn feed_url_from_base(base: &str) -> String {
    let ws_base = base
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1);
    format!("{}/feed", ws_base.trim_end_matches('/'))
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
