use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Key for one cached API response
///
/// Recommendation entries are unique per (app name, count) pair; lookup is
/// case-insensitive on the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Recommend { app_name: String, count: usize },
    Popular { count: usize },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Recommend { app_name, count } => {
                write!(f, "rec:{}:{}", app_name.to_lowercase(), count)
            }
            CacheKey::Popular { count } => write!(f, "popular:{}", count),
        }
    }
}

struct CacheEntry<T> {
    value: T,
    fetched_at: DateTime<Utc>,
}

/// In-memory response cache
///
/// Process-wide, no TTL and no eviction: entries live until the process
/// exits, matching the page-load/unload lifecycle of the session.
pub struct MemoryCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> MemoryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<T> {
        let entries = self.entries.read().await;
        entries.get(&key.to_string()).map(|entry| {
            tracing::debug!(
                key = %key,
                age_secs = (Utc::now() - entry.fetched_at).num_seconds(),
                "Cache hit"
            );
            entry.value.clone()
        })
    }

    pub async fn insert(&self, key: &CacheKey, value: T) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                fetched_at: Utc::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<T: Clone> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
