//! CLI settings file.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use weft_engine::EngineConfig;
use weft_task::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, OpenAiCompatible, Providers};

/// Settings read from `~/.weft/config.json` (or `--config`). Every field is
/// optional; a missing file means defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Result cache time-to-live in milliseconds.
  pub cache_ttl_ms: u64,
  pub provider: ProviderSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
  pub base_url: String,
  /// Environment variable holding the API key.
  pub api_key_env: String,
  pub text_model: String,
  pub image_model: String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      cache_ttl_ms: 300_000,
      provider: ProviderSettings::default(),
    }
  }
}

impl Default for ProviderSettings {
  fn default() -> Self {
    Self {
      base_url: "https://api.openai.com/v1".to_string(),
      api_key_env: "OPENAI_API_KEY".to_string(),
      text_model: DEFAULT_TEXT_MODEL.to_string(),
      image_model: DEFAULT_IMAGE_MODEL.to_string(),
    }
  }
}

impl Settings {
  pub fn load(path: &Path) -> Result<Self> {
    if !path.exists() {
      debug!(path = %path.display(), "settings_file_missing");
      return Ok(Self::default());
    }

    let content = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read settings file: {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse settings file: {}", path.display()))
  }

  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig::default().with_cache_ttl(Duration::from_millis(self.cache_ttl_ms))
  }

  pub fn providers(&self) -> Providers {
    let api_key = std::env::var(&self.provider.api_key_env).ok();
    if api_key.is_none() {
      warn!(
        env = %self.provider.api_key_env,
        "provider_api_key_missing"
      );
    }

    let provider = OpenAiCompatible::new(&self.provider.base_url, api_key)
      .with_text_model(&self.provider.text_model)
      .with_image_model(&self.provider.image_model);
    Providers::from_single(Arc::new(provider))
  }
}
