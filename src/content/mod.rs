//! Content generation — themed prompts and deterministic fallbacks.
//!
//! DESIGN
//! ======
//! Every content kind follows the same shape: pick a theme from a fixed
//! rotation, build a natural-language instruction, hand it to the gateway.
//! Theme rotation indexes `day % len` while day numbering is 1-based, so
//! rotation and numbering are offset by one. Changing the indexing would
//! reshuffle every already-generated day, so the offset stays.

pub mod cache;

use time::Date;

use crate::gemini::{GenerateText, GeminiError, GenerationRequest};
use cache::{ContentKind, ContentStore, DailyContentCache};

pub const QUOTE_THEMES: &[&str] = &[
    "time and urgency",
    "human potential and growth",
    "facing uncertainty",
    "technological progress",
    "collective action",
    "resilience and adaptation",
    "the future we create",
];

pub const CHAT_THEMES: &[&str] = &[
    "communication and meaningful connection",
    "shared experiences in uncertain times",
    "collective wisdom and learning from each other",
    "technology's impact on human relationships",
    "building community and mutual support",
    "finding purpose and meaning in times of change",
    "collaborative problem solving and hope",
];

pub const NEWS_TOPICS: &[&str] = &[
    "breakthrough in understanding human resilience during uncertainty",
    "innovative approaches to building digital community connections",
    "research on collective decision-making in times of change",
    "discoveries about meaning-making in transitional periods",
    "studies on technology's role in fostering genuine relationships",
    "insights into collaborative problem-solving for global challenges",
    "findings on hope and realism in facing unknown futures",
];

pub const FALLBACK_QUOTES: &[&str] = &[
    "The future is not some place we are going, but one we are creating.",
    "In the face of uncertainty, we find our truest selves.",
    "Change is the only constant. Embrace the transformation.",
    "Every moment brings us closer to who we are meant to become.",
    "What appears as an ending is merely a transition.",
];

pub const FALLBACK_NEWS: &[&str] = &[
    "OpenAI releases new multimodal AI model with enhanced capabilities",
    "Google DeepMind achieves breakthrough in quantum computing algorithms",
    "Microsoft announces AI copilot integration across Office applications",
    "Meta unveils advanced AI avatars for virtual reality platforms",
    "Tesla's FSD system reaches new milestone in autonomous driving",
];

pub const FALLBACK_CHAT_THEMES: &[&str] = &[
    "How do you find meaning when everything feels uncertain?",
    "What does genuine human connection look like in a digital world?",
    "How do we build community when traditional structures are changing?",
    "What wisdom can we share to help each other through transition?",
    "How do we balance hope and realism when facing the unknown?",
    "What role does technology play in bringing us together or apart?",
    "How do we create positive change when time feels limited?",
];

/// Number of ticker headlines generated per day.
pub const NEWS_HEADLINES_PER_DAY: usize = 3;

// =============================================================================
// FALLBACK INDEXING
// =============================================================================

/// Deterministic fallback block for a day: `count` consecutive entries
/// starting at `(day - 1) * count % len`, wrapping. Stable across retries so
/// a failing generator shows the same content all day.
#[must_use]
pub fn fallback_block(day: i64, list: &[&str], count: usize) -> Vec<String> {
    let len = list.len();
    let start = usize::try_from((day - 1).max(0)).unwrap_or(0) * count % len;
    (0..count).map(|i| list[(start + i) % len].to_string()).collect()
}

/// Single fallback entry the daily job uses: `list[day % len]`. Shares the
/// off-by-one rotation of theme selection.
#[must_use]
pub fn fallback_item(day: i64, list: &[&str]) -> String {
    let index = usize::try_from(day.max(0)).unwrap_or(0) % list.len();
    list[index].to_string()
}

// =============================================================================
// PROMPTS
// =============================================================================

#[must_use]
pub fn quote_prompt(day: i64) -> String {
    let theme = rotate(QUOTE_THEMES, day);
    format!(
        "Generate a unique philosophical quote about {theme} for day {day} of 1000. \
         Make it thought-provoking and distinct, 15-25 words. \
         Focus on {theme} specifically. Return only the quote text."
    )
}

#[must_use]
pub fn chat_theme_prompt(day: i64) -> String {
    let theme = rotate(CHAT_THEMES, day);
    format!(
        "Generate a thought-provoking discussion question about {theme} for day {day} \
         of a 1000-day countdown. Make it conversational and engaging, designed to \
         spark meaningful chat discussion. 15-30 words. Return only the question."
    )
}

/// The three ticker-headline prompts, one per news slot.
#[must_use]
pub fn news_prompts() -> [String; NEWS_HEADLINES_PER_DAY] {
    let mk = |angle: &str| {
        format!(
            "Generate a realistic AI news headline about {angle}. \
             10-20 words maximum, professional news style. Return only the headline."
        )
    };
    [
        mk("breakthroughs or research"),
        mk("industry developments or company announcements"),
        mk("AI applications or technology trends"),
    ]
}

/// On-demand discussion question for `/generate-theme` (no day context).
#[must_use]
pub fn discussion_prompt(theme: &str) -> String {
    format!(
        "Generate a thought-provoking discussion question about {theme}. \
         Make it conversational and engaging, designed to spark meaningful chat \
         discussion. 15-30 words. Return only the question."
    )
}

/// On-demand headline for `/generate-theme` with `type: news`.
#[must_use]
pub fn headline_prompt(topic: &str) -> String {
    format!(
        "Generate a fictional but realistic news headline about {topic}. \
         Make it sound like it could be from a science or technology news outlet. \
         10-20 words. Be optimistic and forward-looking. Return only the headline."
    )
}

fn rotate<'a>(themes: &[&'a str], day: i64) -> &'a str {
    let index = usize::try_from(day.max(0)).unwrap_or(0) % themes.len();
    themes[index]
}

// =============================================================================
// GENERATORS
// =============================================================================

/// Generate the day's quote. Propagates gateway failure so callers choose
/// their own fallback policy (cache never persists fallbacks, the daily job
/// stores them).
pub async fn generate_quote(ai: &dyn GenerateText, day: i64) -> Result<String, GeminiError> {
    ai.generate(&GenerationRequest::with_defaults(quote_prompt(day))).await
}

pub async fn generate_chat_theme(ai: &dyn GenerateText, day: i64) -> Result<String, GeminiError> {
    ai.generate(&GenerationRequest::with_defaults(chat_theme_prompt(day))).await
}

/// Generate the day's ticker headlines. Fails as a unit: one failed slot
/// fails the batch, so the fallback block stays contiguous.
pub async fn generate_news(ai: &dyn GenerateText, _day: i64) -> Result<Vec<String>, GeminiError> {
    let mut headlines = Vec::with_capacity(NEWS_HEADLINES_PER_DAY);
    for prompt in news_prompts() {
        headlines.push(ai.generate(&GenerationRequest::with_defaults(prompt)).await?);
    }
    Ok(headlines)
}

// =============================================================================
// CACHED COMPOSITION
// =============================================================================

/// Day's quote through the cache: generated at most once per day, fallback
/// list on gateway failure (served, never stored).
pub async fn daily_quote<S: ContentStore>(
    cache: &DailyContentCache<S>,
    ai: &dyn GenerateText,
    day: i64,
    today: Date,
) -> String {
    let content = cache
        .get(ContentKind::Quote, day, today, |d| async move { generate_quote(ai, d).await.map(|q| vec![q]) }, FALLBACK_QUOTES, 1)
        .await;
    content.items.into_iter().next().unwrap_or_default()
}

/// Day's chat theme through the cache.
pub async fn daily_chat_theme<S: ContentStore>(
    cache: &DailyContentCache<S>,
    ai: &dyn GenerateText,
    day: i64,
    today: Date,
) -> String {
    let content = cache
        .get(ContentKind::ChatTheme, day, today, |d| async move {
            generate_chat_theme(ai, d).await.map(|t| vec![t])
        }, FALLBACK_CHAT_THEMES, 1)
        .await;
    content.items.into_iter().next().unwrap_or_default()
}

/// Day's ticker headlines through the cache. A failed batch serves the
/// contiguous fallback block for the day.
pub async fn daily_news<S: ContentStore>(
    cache: &DailyContentCache<S>,
    ai: &dyn GenerateText,
    day: i64,
    today: Date,
) -> Vec<String> {
    cache
        .get(ContentKind::News, day, today, |d| async move { generate_news(ai, d).await }, FALLBACK_NEWS, NEWS_HEADLINES_PER_DAY)
        .await
        .items
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
