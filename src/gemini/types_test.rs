use super::*;

fn request() -> GenerationRequest {
    GenerationRequest::with_defaults("Generate a quote about time.")
}

#[test]
fn defaults_are_valid() {
    assert!(request().validate().is_ok());
}

#[test]
fn empty_prompt_rejected() {
    let mut req = request();
    req.prompt = "   ".into();
    let err = req.validate().unwrap_err();
    assert!(matches!(err, GeminiError::InvalidArgument(_)));
    assert!(err.to_string().contains("Prompt is required"));
}

#[test]
fn unknown_model_rejected() {
    let mut req = request();
    req.model = "gemini-9000-ultra".into();
    let err = req.validate().unwrap_err();
    assert!(err.to_string().contains("Allowed models"));
}

#[test]
fn temperature_bounds_enforced() {
    for bad in [0.0, 0.09, 1.1, -0.5] {
        let mut req = request();
        req.temperature = bad;
        assert!(matches!(req.validate(), Err(GeminiError::InvalidArgument(_))), "temperature {bad} accepted");
    }
    for ok in [0.1, 0.7, 1.0] {
        let mut req = request();
        req.temperature = ok;
        assert!(req.validate().is_ok(), "temperature {ok} rejected");
    }
}

#[test]
fn token_bounds_enforced() {
    for bad in [0_u32, 9, 1001] {
        let mut req = request();
        req.max_tokens = bad;
        assert!(matches!(req.validate(), Err(GeminiError::InvalidArgument(_))), "max_tokens {bad} accepted");
    }
    for ok in [10_u32, 100, 1000] {
        let mut req = request();
        req.max_tokens = ok;
        assert!(req.validate().is_ok(), "max_tokens {ok} rejected");
    }
}

#[test]
fn categories_map_to_user_guidance() {
    assert_eq!(GeminiError::Unauthorized(String::new()).category(), "authentication");
    assert_eq!(
        GeminiError::NotFound { model: "gemini-1.5-pro".into() }.category(),
        "model_unavailable"
    );
    assert_eq!(GeminiError::RateLimited { model: "m".into() }.category(), "rate_limit");
    assert_eq!(GeminiError::Timeout { model: "m".into() }.category(), "timeout");
    assert_eq!(GeminiError::ServiceUnavailable { model: "m".into() }.category(), "service_unavailable");
    assert_eq!(GeminiError::NoContent.category(), "no_content");
}

#[test]
fn missing_key_error_names_the_variable() {
    let err = GeminiError::MissingApiKey { var: "GEMINI_API_KEY".into() };
    assert_eq!(err.to_string(), "Missing GEMINI_API_KEY environment variable");
}
