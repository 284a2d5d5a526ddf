//! Shared key/value store backing the weather cache.
//!
//! A single `get` or `set` is atomic. A get followed by a set is not, and
//! callers must tolerate a concurrent writer in between.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use crate::error::CacheError;

/// A stored value together with the instant it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue {
    pub value: String,
    pub cached_at: DateTime<Utc>,
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns `None` for missing or expired keys.
    async fn get(&self, key: &str) -> Result<Option<CachedValue>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: TimeDelta) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct Entry {
    cached: CachedValue,
    expires_at: DateTime<Utc>,
}

/// Process-local store. Expired entries are dropped lazily on read.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn insert_at(
        &self,
        key: &str,
        value: String,
        cached_at: DateTime<Utc>,
        ttl: TimeDelta,
    ) {
        let mut map = self.entries.write().unwrap();
        map.insert(
            key.to_string(),
            Entry {
                cached: CachedValue { value, cached_at },
                expires_at: cached_at + ttl,
            },
        );
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CachedValue>, CacheError> {
        let now = Utc::now();
        {
            let map = self
                .entries
                .read()
                .map_err(|e| CacheError::Unavailable(e.to_string()))?;
            match map.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.cached.clone())),
                Some(_) => {}
            }
        }

        let mut map = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        if map.get(key).is_some_and(|entry| entry.expires_at <= now) {
            map.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: TimeDelta) -> Result<(), CacheError> {
        let cached_at = Utc::now();
        let mut map = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        map.insert(
            key.to_string(),
            Entry {
                cached: CachedValue { value, cached_at },
                expires_at: cached_at + ttl,
            },
        );
        Ok(())
    }
}
