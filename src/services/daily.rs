//! Daily content service — `daily_content` CRUD and the generation job.
//!
//! DESIGN
//! ======
//! The job is idempotent per day number: it checks for an existing row before
//! generating, so the scheduler can fire as often as it likes. Generation is
//! sequential with a spacing delay between calls to stay under the upstream
//! rate limit; each piece falls back to the fixed lists independently, so a
//! partial upstream outage still produces a complete row.

use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use super::StorageError;
use crate::content;
use crate::countdown::{self, START_DATE, TOTAL_DAYS};
use crate::gemini::GenerateText;

/// Pause between the quote call and the chat-theme call.
const GENERATION_SPACING_MS: u64 = 2000;

// =============================================================================
// TYPES
// =============================================================================

/// A row of the `daily_content` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyContentEntry {
    pub day_number: i32,
    pub date_generated: Date,
    pub main_quote: String,
    pub chat_theme: Option<String>,
    pub daily_news: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// What the daily job did for today.
#[derive(Debug)]
pub enum DailyJobOutcome {
    /// A row already existed; nothing was generated.
    AlreadyExists(DailyContentEntry),
    /// Fresh content was generated and stored.
    Generated(DailyContentEntry),
}

impl DailyJobOutcome {
    #[must_use]
    pub fn entry(&self) -> &DailyContentEntry {
        match self {
            Self::AlreadyExists(entry) | Self::Generated(entry) => entry,
        }
    }
}

/// Fields for a new `daily_content` row.
#[derive(Debug, Clone)]
pub struct NewDailyContent {
    pub day_number: i32,
    pub date_generated: Date,
    pub main_quote: String,
    pub chat_theme: Option<String>,
    pub daily_news: Option<String>,
}

// =============================================================================
// CRUD
// =============================================================================

/// Most recently created entry, if any.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_latest_daily_content(pool: &PgPool) -> Result<Option<DailyContentEntry>, StorageError> {
    let row = sqlx::query_as::<_, DailyContentEntry>(
        "SELECT day_number, date_generated, main_quote, chat_theme, daily_news, created_at
         FROM daily_content
         ORDER BY created_at DESC
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Entry for a specific day number, if any.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_daily_content_by_day(pool: &PgPool, day: i32) -> Result<Option<DailyContentEntry>, StorageError> {
    let row = sqlx::query_as::<_, DailyContentEntry>(
        "SELECT day_number, date_generated, main_quote, chat_theme, daily_news, created_at
         FROM daily_content
         WHERE day_number = $1",
    )
    .bind(day)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Insert a new entry and return the stored row.
///
/// # Errors
///
/// Returns a database error if the insert fails (including a duplicate day).
pub async fn insert_daily_content(pool: &PgPool, new: NewDailyContent) -> Result<DailyContentEntry, StorageError> {
    let row = sqlx::query_as::<_, DailyContentEntry>(
        "INSERT INTO daily_content (day_number, date_generated, main_quote, chat_theme, daily_news)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING day_number, date_generated, main_quote, chat_theme, daily_news, created_at",
    )
    .bind(new.day_number)
    .bind(new.date_generated)
    .bind(&new.main_quote)
    .bind(&new.chat_theme)
    .bind(&new.daily_news)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Which generated field an on-demand `/generate-theme` call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedField {
    ChatTheme,
    DailyNews,
}

impl GeneratedField {
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::ChatTheme => "chat_theme",
            Self::DailyNews => "daily_news",
        }
    }
}

/// Placeholder quote stored when an on-demand generation creates the day's
/// row before the daily job has run.
const PLACEHOLDER_QUOTE: &str = "Generated via button";

/// Store on-demand content into today's row, creating it if needed. This is
/// the one write path that updates an existing row: the field is replaced,
/// everything else is preserved.
///
/// # Errors
///
/// Returns a database error if the upsert fails.
pub async fn upsert_generated_field(
    pool: &PgPool,
    day_number: i32,
    date_generated: Date,
    field: GeneratedField,
    value: &str,
) -> Result<DailyContentEntry, StorageError> {
    let sql = match field {
        GeneratedField::ChatTheme => {
            "INSERT INTO daily_content (day_number, date_generated, main_quote, chat_theme)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (day_number) DO UPDATE SET chat_theme = EXCLUDED.chat_theme
             RETURNING day_number, date_generated, main_quote, chat_theme, daily_news, created_at"
        }
        GeneratedField::DailyNews => {
            "INSERT INTO daily_content (day_number, date_generated, main_quote, daily_news)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (day_number) DO UPDATE SET daily_news = EXCLUDED.daily_news
             RETURNING day_number, date_generated, main_quote, chat_theme, daily_news, created_at"
        }
    };
    let row = sqlx::query_as::<_, DailyContentEntry>(sql)
        .bind(day_number)
        .bind(date_generated)
        .bind(PLACEHOLDER_QUOTE)
        .bind(value)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// Five most recent entries, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn recent_daily_content(pool: &PgPool, limit: i64) -> Result<Vec<DailyContentEntry>, StorageError> {
    let rows = sqlx::query_as::<_, DailyContentEntry>(
        "SELECT day_number, date_generated, main_quote, chat_theme, daily_news, created_at
         FROM daily_content
         ORDER BY day_number DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Total number of entries.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn count_daily_content(pool: &PgPool) -> Result<i64, StorageError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM daily_content")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// =============================================================================
// DAILY JOB
// =============================================================================

/// Generate and store today's content if it does not exist yet.
///
/// Day numbering uses the UTC+14 frame so content is ready before any local
/// midnight. Each piece falls back to the fixed lists on gateway failure;
/// the row is stored either way so the day is never empty.
///
/// # Errors
///
/// Returns a database error if the existence check or insert fails. Gateway
/// failures are absorbed by the fallbacks and never fail the job.
pub async fn generate_for_today(pool: &PgPool, ai: &dyn GenerateText) -> Result<DailyJobOutcome, StorageError> {
    let now = OffsetDateTime::now_utc();
    let day = countdown::current_day_number(now, START_DATE, TOTAL_DAYS);
    let day_number = i32::try_from(day).unwrap_or(i32::MAX);
    let today = now.date();

    if let Some(existing) = get_daily_content_by_day(pool, day_number).await? {
        info!(day_number, "daily content already exists");
        return Ok(DailyJobOutcome::AlreadyExists(existing));
    }

    info!(day_number, date = %today, "generating daily content");

    let main_quote = match content::generate_quote(ai, day).await {
        Ok(quote) => quote,
        Err(e) => {
            warn!(day_number, error = %e, "quote generation failed, using fallback");
            content::fallback_item(day, content::FALLBACK_QUOTES)
        }
    };

    tokio::time::sleep(Duration::from_millis(GENERATION_SPACING_MS)).await;

    let chat_theme = match content::generate_chat_theme(ai, day).await {
        Ok(theme) => theme,
        Err(e) => {
            warn!(day_number, error = %e, "chat theme generation failed, using fallback");
            content::fallback_item(day, content::FALLBACK_CHAT_THEMES)
        }
    };

    let entry = insert_daily_content(
        pool,
        NewDailyContent {
            day_number,
            date_generated: today,
            main_quote,
            chat_theme: Some(chat_theme),
            daily_news: None,
        },
    )
    .await?;

    info!(day_number, "daily content generated and stored");
    Ok(DailyJobOutcome::Generated(entry))
}

// =============================================================================
// VERIFICATION
// =============================================================================

/// Health report for the daily content system.
#[derive(Debug, Serialize)]
pub struct VerificationReport {
    pub current_day: i64,
    pub today_exists: bool,
    pub needs_generation: bool,
    pub total_entries: i64,
    pub recent: Vec<DailyContentEntry>,
}

/// Build the verification report consumed by `/verify-daily-content`.
///
/// # Errors
///
/// Returns a database error if any of the queries fail.
pub async fn verification_report(pool: &PgPool) -> Result<VerificationReport, StorageError> {
    let now = OffsetDateTime::now_utc();
    let current_day = countdown::current_day_number(now, START_DATE, TOTAL_DAYS);
    let day_number = i32::try_from(current_day).unwrap_or(i32::MAX);

    let today = get_daily_content_by_day(pool, day_number).await?;
    let recent = recent_daily_content(pool, 5).await?;
    let total_entries = count_daily_content(pool).await?;

    let today_exists = today.is_some();
    Ok(VerificationReport {
        current_day,
        today_exists,
        needs_generation: !today_exists,
        total_entries,
        recent,
    })
}
