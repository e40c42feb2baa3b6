//! Gemini `generateContent` HTTP client.
//!
//! DESIGN
//! ======
//! Thin HTTP wrapper with pure parsing in `parse_response` for testability.
//! Two rate-limit modes exist deliberately: the daily job retries a 429 with
//! linear backoff, the interactive lab endpoint surfaces it immediately.

use std::time::Duration;

use tracing::warn;

use super::types::{GeminiError, GenerationRequest};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT_SECS: u64 = 25;
const CONNECT_TIMEOUT_SECS: u64 = 10;

const RATE_LIMIT_RETRY_ATTEMPTS: u32 = 3;
const RATE_LIMIT_RETRY_BASE_MS: u64 = 5000;

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    retry_on_rate_limit: bool,
    retry_base_ms: u64,
}

impl GeminiClient {
    /// Build a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: String) -> Result<Self, GeminiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GeminiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_on_rate_limit: false,
            retry_base_ms: RATE_LIMIT_RETRY_BASE_MS,
        })
    }

    /// Build a client from the `GEMINI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::MissingApiKey`] if the variable is not set.
    pub fn from_env() -> Result<Self, GeminiError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::MissingApiKey { var: "GEMINI_API_KEY".into() })?;
        Self::new(api_key)
    }

    /// Enable the batch-generation retry mode: up to 3 attempts on HTTP 429
    /// with linearly increasing backoff. Interactive callers leave this off.
    #[must_use]
    pub fn with_retry_on_rate_limit(mut self, retry: bool) -> Self {
        self.retry_on_rate_limit = retry;
        self
    }

    /// Override the API base URL (test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Shrink the rate-limit backoff so retry tests don't sit out real delays.
    #[cfg(test)]
    #[must_use]
    pub(super) fn with_retry_base_ms(mut self, base_ms: u64) -> Self {
        self.retry_base_ms = base_ms;
        self
    }

    pub(super) async fn generate_inner(&self, request: &GenerationRequest) -> Result<String, GeminiError> {
        request.validate()?;

        let attempts = if self.retry_on_rate_limit { RATE_LIMIT_RETRY_ATTEMPTS } else { 1 };
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.generate_once(request).await {
                Err(GeminiError::RateLimited { model }) if attempt < attempts => {
                    let delay = self.retry_base_ms * u64::from(attempt);
                    warn!(%model, attempt, delay_ms = delay, "gemini rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                other => return other,
            }
        }
    }

    async fn generate_once(&self, request: &GenerationRequest) -> Result<String, GeminiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );
        let body = ApiRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &request.prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                GeminiError::Timeout { model: request.model.clone() }
            } else {
                GeminiError::Unknown(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GeminiError::Timeout { model: request.model.clone() }
            } else {
                GeminiError::Unknown(e.to_string())
            }
        })?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &text, &request.model));
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(serde::Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract the generated text from a 2xx response body.
///
/// A success without a non-empty text part is [`GeminiError::NoContent`], not
/// a transport error — the API answered, it just had nothing to say.
pub(crate) fn parse_response(json: &str) -> Result<String, GeminiError> {
    let api: ApiResponse =
        serde_json::from_str(json).map_err(|e| GeminiError::Unknown(format!("response parse failed: {e}")))?;

    let text = api
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    text.ok_or(GeminiError::NoContent)
}

/// Map a non-2xx status to the failure taxonomy.
pub(crate) fn classify_status(status: u16, body: &str, model: &str) -> GeminiError {
    let detail = extract_error_message(body);
    match status {
        400 => GeminiError::InvalidArgument(format!("Invalid request for model {model}: {detail}")),
        401 => GeminiError::Unauthorized(detail),
        403 => GeminiError::Forbidden { model: model.to_string(), detail },
        404 => GeminiError::NotFound { model: model.to_string() },
        429 => GeminiError::RateLimited { model: model.to_string() },
        502 | 503 => GeminiError::ServiceUnavailable { model: model.to_string() },
        _ => GeminiError::Unknown(format!("Gemini API error {status}: {detail}")),
    }
}

/// Pull a human-readable message out of an error body, falling back to the
/// raw text when it is not the expected JSON shape.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
