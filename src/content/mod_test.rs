use super::*;
use crate::gemini::GenerateText;
use std::sync::Mutex;

/// Mock gateway: scripted responses, records every prompt it saw.
struct ScriptedGateway {
    responses: Mutex<Vec<Result<String, GeminiError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    fn new(responses: Vec<Result<String, GeminiError>>) -> Self {
        Self { responses: Mutex::new(responses), prompts: Mutex::new(Vec::new()) }
    }
}

#[async_trait::async_trait]
impl GenerateText for ScriptedGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeminiError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.responses.lock().unwrap().remove(0)
    }
}

// ===== theme rotation =====

#[test]
fn theme_rotation_is_offset_from_day_numbering() {
    // Day 1 takes index 1, not 0 — the rotation is intentionally off by one
    // from the 1-based day number.
    assert!(quote_prompt(1).contains(QUOTE_THEMES[1]));
    assert!(quote_prompt(7).contains(QUOTE_THEMES[0]));
    assert!(chat_theme_prompt(1).contains(CHAT_THEMES[1]));
}

#[test]
fn prompts_embed_the_day_number() {
    assert!(quote_prompt(388).contains("day 388 of 1000"));
    assert!(chat_theme_prompt(42).contains("day 42"));
}

// ===== fallback indexing =====

#[test]
fn fallback_block_is_contiguous_and_wraps() {
    let list = &["a", "b", "c", "d", "e"];
    assert_eq!(fallback_block(1, list, 3), vec!["a", "b", "c"]);
    assert_eq!(fallback_block(2, list, 3), vec!["d", "e", "a"]);
    assert_eq!(fallback_block(3, list, 3), vec!["b", "c", "d"]);
}

#[test]
fn fallback_block_single_item() {
    let list = &["a", "b", "c"];
    assert_eq!(fallback_block(1, list, 1), vec!["a"]);
    assert_eq!(fallback_block(4, list, 1), vec!["a"]);
}

#[test]
fn fallback_item_rotates_by_day_mod_len() {
    assert_eq!(fallback_item(0, FALLBACK_QUOTES), FALLBACK_QUOTES[0]);
    assert_eq!(fallback_item(1, FALLBACK_QUOTES), FALLBACK_QUOTES[1]);
    assert_eq!(fallback_item(5, FALLBACK_QUOTES), FALLBACK_QUOTES[0]);
}

// ===== generators =====

#[tokio::test]
async fn news_generates_one_headline_per_prompt() {
    let gateway = ScriptedGateway::new(vec![
        Ok("headline one".into()),
        Ok("headline two".into()),
        Ok("headline three".into()),
    ]);
    let headlines = generate_news(&gateway, 12).await.unwrap();
    assert_eq!(headlines.len(), NEWS_HEADLINES_PER_DAY);
    assert_eq!(gateway.prompts.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn news_fails_as_a_unit() {
    let gateway = ScriptedGateway::new(vec![
        Ok("headline one".into()),
        Err(GeminiError::NoContent),
    ]);
    assert!(generate_news(&gateway, 12).await.is_err());
}

// ===== cached composition =====

#[tokio::test]
async fn daily_news_caches_the_generated_batch() {
    use crate::content::cache::MemoryStore;
    use time::macros::date;

    let cache = DailyContentCache::new(MemoryStore::new());
    let today = date!(2025 - 07 - 01);

    let gateway = ScriptedGateway::new(vec![
        Ok("one".into()),
        Ok("two".into()),
        Ok("three".into()),
    ]);
    let first = daily_news(&cache, &gateway, 4, today).await;
    assert_eq!(first, vec!["one", "two", "three"]);

    // Cached: the second call never touches the gateway.
    let empty = ScriptedGateway::new(vec![]);
    let second = daily_news(&cache, &empty, 4, today).await;
    assert_eq!(second, first);
    assert!(empty.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn daily_news_falls_back_without_caching() {
    use crate::content::cache::MemoryStore;
    use time::macros::date;

    let cache = DailyContentCache::new(MemoryStore::new());
    let today = date!(2025 - 07 - 01);

    let gateway = ScriptedGateway::new(vec![Err(GeminiError::NoContent)]);
    let headlines = daily_news(&cache, &gateway, 1, today).await;
    assert_eq!(headlines, fallback_block(1, FALLBACK_NEWS, NEWS_HEADLINES_PER_DAY));
    assert!(cache.lookup(ContentKind::News, 1, today).is_none());
}

#[tokio::test]
async fn daily_quote_returns_a_single_item() {
    use crate::content::cache::MemoryStore;
    use time::macros::date;

    let cache = DailyContentCache::new(MemoryStore::new());
    let gateway = ScriptedGateway::new(vec![Ok("a fine quote".into())]);
    let quote = daily_quote(&cache, &gateway, 2, date!(2025 - 07 - 01)).await;
    assert_eq!(quote, "a fine quote");
}

#[tokio::test]
async fn quote_generator_uses_default_tuning() {
    let gateway = ScriptedGateway::new(vec![Ok("a quote".into())]);
    let quote = generate_quote(&gateway, 9).await.unwrap();
    assert_eq!(quote, "a quote");
    let prompts = gateway.prompts.lock().unwrap();
    assert!(prompts[0].contains("philosophical quote"));
}
