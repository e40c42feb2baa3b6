//! Day-keyed content cache with same-day validity.
//!
//! DESIGN
//! ======
//! Entries are keyed `(kind, day)` and stamped with the calendar date they
//! were written. A stamp that is not today's date is a miss; the sweep at
//! startup removes stale and unparsable entries. Fallback content produced
//! after a generator failure is returned but never persisted, so the next
//! call retries generation instead of pinning the fallback for the day.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::warn;

use super::fallback_block;

const KEY_PREFIX: &str = "doomsday-";

// =============================================================================
// STORE
// =============================================================================

/// Durable key-value backing for the cache. The file store is the production
/// shape; tests use the in-memory one.
pub trait ContentStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    /// # Errors
    ///
    /// Returns an I/O error if the write cannot be made durable.
    fn put(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// In-memory store for tests and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.keys().cloned().collect()).unwrap_or_default()
    }
}

/// Single-file JSON store: the whole map is rewritten on every put/remove.
/// Entry counts stay tiny (a handful per day), so simplicity wins.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an existing file cannot be read. A corrupt
    /// file is treated as empty rather than fatal.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "cache file corrupt, starting empty");
                HashMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e),
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> io::Result<()> {
        let raw = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
        std::fs::write(&self.path, raw)
    }
}

impl ContentStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::other("cache lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(key).is_some() {
                if let Err(e) = self.flush(&entries) {
                    warn!(error = %e, "cache flush after remove failed");
                }
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.keys().cloned().collect()).unwrap_or_default()
    }
}

// =============================================================================
// CACHE
// =============================================================================

/// Kind half of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Quote,
    News,
    ChatTheme,
}

impl ContentKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::News => "news",
            Self::ChatTheme => "chat-theme",
        }
    }
}

/// One logical day's content for a kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedContent {
    pub items: Vec<String>,
    pub day: i64,
    /// Calendar-date stamp; string-compared against today's date.
    pub date: String,
}

pub struct DailyContentCache<S: ContentStore> {
    store: S,
}

impl<S: ContentStore> DailyContentCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn key(kind: ContentKind, day: i64) -> String {
        format!("{KEY_PREFIX}{}-{day}", kind.as_str())
    }

    /// Valid cached entry for `(kind, day)`, if stamped with today's date.
    #[must_use]
    pub fn lookup(&self, kind: ContentKind, day: i64, today: Date) -> Option<CachedContent> {
        let raw = self.store.get(&Self::key(kind, day))?;
        let entry: CachedContent = serde_json::from_str(&raw).ok()?;
        (entry.date == today.to_string()).then_some(entry)
    }

    /// Cached-or-generated content for the day.
    ///
    /// Cache hit → stored entry. Miss → run the generator; on success persist
    /// and return, on failure return the deterministic fallback block without
    /// persisting it.
    pub async fn get<Fut, E>(
        &self,
        kind: ContentKind,
        day: i64,
        today: Date,
        generator: impl FnOnce(i64) -> Fut,
        fallback: &[&str],
        count: usize,
    ) -> CachedContent
    where
        Fut: Future<Output = Result<Vec<String>, E>>,
        E: std::fmt::Display,
    {
        if let Some(cached) = self.lookup(kind, day, today) {
            return cached;
        }

        match generator(day).await {
            Ok(items) => {
                let entry = CachedContent { items, day, date: today.to_string() };
                match serde_json::to_string(&entry) {
                    Ok(raw) => {
                        if let Err(e) = self.store.put(&Self::key(kind, day), &raw) {
                            warn!(kind = kind.as_str(), day, error = %e, "cache write failed");
                        }
                    }
                    Err(e) => warn!(kind = kind.as_str(), day, error = %e, "cache encode failed"),
                }
                entry
            }
            Err(e) => {
                warn!(kind = kind.as_str(), day, error = %e, "generation failed, serving fallback");
                CachedContent {
                    items: fallback_block(day, fallback, count),
                    day,
                    date: today.to_string(),
                }
            }
        }
    }

    /// Remove every entry not stamped with today's date, and any entry that
    /// no longer parses. Run once at startup.
    pub fn sweep(&self, today: Date) {
        let today = today.to_string();
        for key in self.store.keys() {
            if !key.starts_with(KEY_PREFIX) {
                continue;
            }
            let stale = match self.store.get(&key) {
                Some(raw) => serde_json::from_str::<CachedContent>(&raw)
                    .map_or(true, |entry| entry.date != today),
                None => continue,
            };
            if stale {
                self.store.remove(&key);
            }
        }
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
