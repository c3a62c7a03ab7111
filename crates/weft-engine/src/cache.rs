//! Time-bounded memoization of node results, keyed by a node's `cache_key`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

/// Default time-to-live for cached results.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry {
  value: Value,
  stored_at: Instant,
}

/// Result cache shared by every run of an engine.
///
/// Entries expire lazily: a stale entry is ignored on read but stays in the
/// map until it is overwritten, removed or the cache is cleared.
#[derive(Debug, Clone)]
pub struct ResultCache {
  entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
  ttl: Duration,
}

impl ResultCache {
  pub fn new(ttl: Duration) -> Self {
    Self {
      entries: Arc::new(RwLock::new(HashMap::new())),
      ttl,
    }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// The value stored under `key`, if it is younger than the TTL.
  pub fn get(&self, key: &str) -> Option<Value> {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    entries
      .get(key)
      .filter(|entry| entry.stored_at.elapsed() < self.ttl)
      .map(|entry| entry.value.clone())
  }

  pub fn put(&self, key: impl Into<String>, value: Value) {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries.insert(
      key.into(),
      CacheEntry {
        value,
        stored_at: Instant::now(),
      },
    );
  }

  pub fn remove(&self, key: &str) -> Option<Value> {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries.remove(key).map(|entry| entry.value)
  }

  pub fn clear(&self) {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries.clear();
  }

  /// Number of stored entries, stale ones included.
  pub fn len(&self) -> usize {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Default for ResultCache {
  fn default() -> Self {
    Self::new(DEFAULT_CACHE_TTL)
  }
}
