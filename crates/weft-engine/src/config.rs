use std::time::Duration;

use crate::cache::DEFAULT_CACHE_TTL;

/// Configuration for the workflow engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// How long a cached node result stays valid.
  pub cache_ttl: Duration,
}

impl EngineConfig {
  pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
    self.cache_ttl = ttl;
    self
  }
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      cache_ttl: DEFAULT_CACHE_TTL,
    }
  }
}
