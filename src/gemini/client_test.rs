use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::gemini::GenerateText;

// ===== response parsing =====

#[test]
fn parse_extracts_first_candidate_text() {
    let json = serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": "  The future is unwritten.  " }] }
        }]
    })
    .to_string();
    assert_eq!(parse_response(&json).unwrap(), "The future is unwritten.");
}

#[test]
fn parse_empty_candidates_is_no_content() {
    let json = serde_json::json!({ "candidates": [] }).to_string();
    assert!(matches!(parse_response(&json), Err(GeminiError::NoContent)));
}

#[test]
fn parse_blank_text_is_no_content() {
    let json = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
    })
    .to_string();
    assert!(matches!(parse_response(&json), Err(GeminiError::NoContent)));
}

#[test]
fn parse_missing_parts_is_no_content() {
    let json = serde_json::json!({ "candidates": [{ "content": { "parts": [] } }] }).to_string();
    assert!(matches!(parse_response(&json), Err(GeminiError::NoContent)));
}

#[test]
fn parse_malformed_json_is_unknown() {
    assert!(matches!(parse_response("not json"), Err(GeminiError::Unknown(_))));
}

// ===== status classification =====

#[test]
fn statuses_map_to_taxonomy() {
    let model = "gemini-1.5-flash";
    assert!(matches!(classify_status(400, "{}", model), GeminiError::InvalidArgument(_)));
    assert!(matches!(classify_status(401, "{}", model), GeminiError::Unauthorized(_)));
    assert!(matches!(classify_status(403, "{}", model), GeminiError::Forbidden { .. }));
    assert!(matches!(classify_status(404, "{}", model), GeminiError::NotFound { .. }));
    assert!(matches!(classify_status(429, "{}", model), GeminiError::RateLimited { .. }));
    assert!(matches!(classify_status(502, "{}", model), GeminiError::ServiceUnavailable { .. }));
    assert!(matches!(classify_status(503, "{}", model), GeminiError::ServiceUnavailable { .. }));
    assert!(matches!(classify_status(500, "{}", model), GeminiError::Unknown(_)));
}

#[test]
fn error_body_message_extracted_when_json() {
    let body = serde_json::json!({ "error": { "message": "quota exhausted" } }).to_string();
    let err = classify_status(400, &body, "gemini-1.5-flash");
    assert!(err.to_string().contains("quota exhausted"));
}

#[test]
fn error_body_falls_back_to_raw_text() {
    let err = classify_status(400, "<html>bad gateway</html>", "gemini-1.5-flash");
    assert!(err.to_string().contains("<html>bad gateway</html>"));
}

// ===== validation short-circuits the network =====

#[tokio::test]
async fn invalid_temperature_never_reaches_the_network() {
    // The base URL points at a closed port; a network attempt would error
    // with a connection failure, not InvalidArgument.
    let client = GeminiClient::new("test-key".into())
        .unwrap()
        .with_base_url("http://127.0.0.1:1");
    let mut req = GenerationRequest::with_defaults("prompt");
    req.temperature = 1.1;
    let err = client.generate(&req).await.unwrap_err();
    assert!(matches!(err, GeminiError::InvalidArgument(_)));
}

#[tokio::test]
async fn zero_temperature_never_reaches_the_network() {
    let client = GeminiClient::new("test-key".into())
        .unwrap()
        .with_base_url("http://127.0.0.1:1");
    let mut req = GenerationRequest::with_defaults("prompt");
    req.temperature = 0.0;
    let err = client.generate(&req).await.unwrap_err();
    assert!(matches!(err, GeminiError::InvalidArgument(_)));
}

// ===== rate-limit retry =====

/// Local server that answers every request with HTTP 429 and counts hits.
async fn rate_limited_server() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = axum::Router::new().fallback(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (
                axum::http::StatusCode::TOO_MANY_REQUESTS,
                axum::Json(serde_json::json!({ "error": { "message": "quota exhausted" } })),
            )
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), hits)
}

#[tokio::test]
async fn retry_mode_makes_three_attempts_on_rate_limit() {
    let (base_url, hits) = rate_limited_server().await;
    let client = GeminiClient::new("test-key".into())
        .unwrap()
        .with_base_url(base_url)
        .with_retry_on_rate_limit(true)
        .with_retry_base_ms(1);

    let req = GenerationRequest::with_defaults("prompt");
    let err = client.generate(&req).await.unwrap_err();
    assert!(matches!(err, GeminiError::RateLimited { .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn interactive_mode_surfaces_rate_limit_immediately() {
    let (base_url, hits) = rate_limited_server().await;
    let client = GeminiClient::new("test-key".into())
        .unwrap()
        .with_base_url(base_url);

    let req = GenerationRequest::with_defaults("prompt");
    let err = client.generate(&req).await.unwrap_err();
    assert!(matches!(err, GeminiError::RateLimited { .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
