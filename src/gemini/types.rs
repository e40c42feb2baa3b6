//! Gemini request shape, validation bounds, and failure taxonomy.

use serde::{Deserialize, Serialize};

/// Models the gateway will accept. Anything else fails validation before
/// reaching the network.
pub const ALLOWED_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
    "gemini-1.5-pro",
    "gemini-2.5-pro-experimental",
];

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 100;

pub const MIN_TEMPERATURE: f64 = 0.1;
pub const MAX_TEMPERATURE: f64 = 1.0;
pub const MIN_MAX_TOKENS: u32 = 10;
pub const MAX_MAX_TOKENS: u32 = 1000;

// =============================================================================
// ERROR
// =============================================================================

/// Failure taxonomy for gateway calls, keyed off the upstream HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// Bad model, temperature, token count, or empty prompt. Never reaches
    /// the network.
    #[error("{0}")]
    InvalidArgument(String),

    /// The required API key environment variable is not set.
    #[error("Missing {var} environment variable")]
    MissingApiKey { var: String },

    #[error("Authentication failed: check API key configuration")]
    Unauthorized(String),

    #[error("Access denied: model {model} may not be available for your account")]
    Forbidden { model: String, detail: String },

    #[error("Model not found: {model} is not available")]
    NotFound { model: String },

    #[error("Rate limit exceeded for model {model}: try again later")]
    RateLimited { model: String },

    #[error("Gemini service unavailable for model {model}: try a different model")]
    ServiceUnavailable { model: String },

    /// The 25-second request deadline elapsed and the call was aborted.
    #[error("Request timeout: {model} took too long to respond")]
    Timeout { model: String },

    /// The API answered 2xx but the payload held no generated text.
    #[error("No content generated from AI")]
    NoContent,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("Gemini API error: {0}")]
    Unknown(String),
}

impl GeminiError {
    /// User-facing error category, surfaced by `/lab-generate`.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::MissingApiKey { .. } | Self::Unauthorized(_) => "authentication",
            Self::Forbidden { .. } | Self::NotFound { .. } => "model_unavailable",
            Self::RateLimited { .. } => "rate_limit",
            Self::ServiceUnavailable { .. } => "service_unavailable",
            Self::Timeout { .. } => "timeout",
            Self::NoContent => "no_content",
            Self::HttpClientBuild(_) | Self::Unknown(_) => "unknown",
        }
    }

    /// Actionable follow-up for the category, mirrored into error payloads.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::MissingApiKey { .. } | Self::Unauthorized(_) => {
                "Check API key configuration in environment variables"
            }
            Self::Forbidden { .. } | Self::NotFound { .. } => {
                "This model may not be available for your account. Try gemini-2.0-flash instead"
            }
            Self::RateLimited { .. } => "Wait a few minutes before trying again, or use a different model",
            Self::Timeout { .. } => "Try using a faster model like gemini-2.0-flash",
            Self::ServiceUnavailable { .. } => {
                "Gemini service is temporarily unavailable. Try again in a few minutes"
            }
            _ => "Try again or contact support",
        }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// Parameters for one generation call. Validated before any network traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// A request with the default model and tuning, as the site's own
    /// content generation uses.
    #[must_use]
    pub fn with_defaults(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Fail fast on out-of-bounds parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> Result<(), GeminiError> {
        if self.prompt.trim().is_empty() {
            return Err(GeminiError::InvalidArgument("Prompt is required".into()));
        }
        if !ALLOWED_MODELS.contains(&self.model.as_str()) {
            return Err(GeminiError::InvalidArgument(format!(
                "Invalid model. Allowed models: {}",
                ALLOWED_MODELS.join(", ")
            )));
        }
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(GeminiError::InvalidArgument(format!(
                "Temperature must be between {MIN_TEMPERATURE} and {MAX_TEMPERATURE}"
            )));
        }
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
            return Err(GeminiError::InvalidArgument(format!(
                "Max tokens must be between {MIN_MAX_TOKENS} and {MAX_MAX_TOKENS}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
