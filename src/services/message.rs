//! Message service — CRUD over the `messages` table.
//!
//! DESIGN
//! ======
//! The server is the sole source of truth for message identity and order.
//! Inserts return the full stored row so the caller can publish it on the
//! feed verbatim; clients never synthesize ids.

use sqlx::PgPool;

use super::StorageError;
use crate::state::MessageRecord;

/// Insert a message and return the stored row.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn insert_message(
    pool: &PgPool,
    nickname: &str,
    text: &str,
    color: &str,
) -> Result<MessageRecord, StorageError> {
    let row = sqlx::query_as::<_, MessageRecord>(
        "INSERT INTO messages (nickname, text, color)
         VALUES ($1, $2, $3)
         RETURNING id, nickname, text, color, created_at",
    )
    .bind(nickname)
    .bind(text)
    .bind(color)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// List every message, ascending by creation time.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_messages(pool: &PgPool) -> Result<Vec<MessageRecord>, StorageError> {
    let rows = sqlx::query_as::<_, MessageRecord>(
        "SELECT id, nickname, text, color, created_at
         FROM messages
         ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Delete every message. Returns the number of rows removed.
///
/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn delete_all_messages(pool: &PgPool) -> Result<i64, StorageError> {
    let result = sqlx::query("DELETE FROM messages").execute(pool).await?;
    Ok(i64::try_from(result.rows_affected()).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
