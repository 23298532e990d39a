//! Explicit time-to-live cache for slow-changing payloads.
//!
//! The cache is a plain value owned by whoever needs it. Expiry is checked
//! against a caller-supplied clock reading, and entries can be persisted to a
//! JSON file between runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry<V> {
    stored_at: DateTime<Utc>,
    value: V,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtlCache<V> {
    #[serde(with = "ttl_seconds")]
    ttl: Duration,
    entries: HashMap<String, Entry<V>>,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the value for `key` if it was stored less than one TTL before `now`.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|e| now - e.stored_at < self.ttl)
            .map(|e| &e.value)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.get_at(key, Utc::now())
    }

    pub fn insert_at(&mut self, key: impl Into<String>, value: V, now: DateTime<Utc>) {
        self.entries.insert(
            key.into(),
            Entry {
                stored_at: now,
                value,
            },
        );
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Utc::now());
    }

    /// Drops `key`, returning whether it was present.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Time left before `key` expires; zero once expired, `None` if absent.
    pub fn time_until_expiry_at(&self, key: &str, now: DateTime<Utc>) -> Option<Duration> {
        self.entries.get(key).map(|e| {
            let left = self.ttl - (now - e.stored_at);
            left.max(Duration::zero())
        })
    }

    /// Removes every expired entry.
    pub fn purge_expired_at(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| now - e.stored_at < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize + DeserializeOwned> TtlCache<V> {
    /// Loads a cache from `path`, or starts empty if the file does not exist.
    ///
    /// The `ttl` given here wins over the one stored in the file.
    pub fn load(path: &Path, ttl: Duration) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No cache file, starting empty");
            return Ok(Self::new(ttl));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cache {}", path.display()))?;
        let mut cache: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse cache {}", path.display()))?;
        cache.ttl = ttl;
        Ok(cache)
    }

    /// Writes the cache to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create cache dir {}", parent.display()))?;
        }
        std::fs::write(path, serde_json::to_vec(self)?)
            .with_context(|| format!("failed to write cache {}", path.display()))?;
        debug!(path = %path.display(), entries = self.len(), "Cache saved");
        Ok(())
    }
}

mod ttl_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ttl: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(ttl.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::seconds(i64::deserialize(d)?))
    }
}
