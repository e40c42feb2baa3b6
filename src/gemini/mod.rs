//! Gemini gateway — HTTP wrapper for the generative-text API.
//!
//! DESIGN
//! ======
//! One module per concern, mirroring the provider split elsewhere in the
//! codebase: `types` holds the request shape, validation bounds, and the
//! failure taxonomy; `client` is the thin HTTP wrapper with pure response
//! parsing. The [`GenerateText`] trait is the seam — handlers and the daily
//! job depend on it, tests mock it.

pub mod client;
pub mod types;

pub use client::GeminiClient;
pub use types::{GenerationRequest, GeminiError};

/// Provider-neutral async trait for text generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait GenerateText: Send + Sync {
    /// Generate text for a validated request.
    ///
    /// # Errors
    ///
    /// Returns a [`GeminiError`] if validation fails, the request fails, or
    /// the response carries no generated text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeminiError>;
}

#[async_trait::async_trait]
impl GenerateText for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeminiError> {
        self.generate_inner(request).await
    }
}
