//! Seams for the generative services the engine treats as opaque.
//!
//! Handlers only see these traits; [`crate::OpenAiCompatible`] is the bundled
//! HTTP implementation and tests supply in-process fakes.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a text, image or enhancement provider.
#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("provider error: {0}")]
  Provider(String),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("provider returned no output")]
  Empty,
}

/// Result of prompt enhancement.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedPrompt {
  pub original_prompt: String,
  pub final_prompt: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
  /// Generate text for `prompt`. `None` lets the provider pick its default model.
  async fn generate_text(&self, prompt: &str, model: Option<&str>)
  -> Result<String, GenerationError>;
}

#[async_trait]
pub trait PromptEnhancer: Send + Sync {
  async fn enhance_prompt(&self, prompt: &str) -> Result<EnhancedPrompt, GenerationError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
  /// Generate images and return their references (URLs or data URIs).
  async fn generate_image(
    &self,
    prompt: &str,
    aspect_ratio: &str,
    model: Option<&str>,
  ) -> Result<Vec<String>, GenerationError>;
}

/// The set of providers the built-in handlers call out to.
#[derive(Clone)]
pub struct Providers {
  pub text: Arc<dyn TextGenerator>,
  pub enhancer: Arc<dyn PromptEnhancer>,
  pub image: Arc<dyn ImageGenerator>,
}

impl Providers {
  pub fn new(
    text: Arc<dyn TextGenerator>,
    enhancer: Arc<dyn PromptEnhancer>,
    image: Arc<dyn ImageGenerator>,
  ) -> Self {
    Self {
      text,
      enhancer,
      image,
    }
  }

  /// Use one provider for all three capabilities.
  pub fn from_single<P>(provider: Arc<P>) -> Self
  where
    P: TextGenerator + PromptEnhancer + ImageGenerator + 'static,
  {
    Self {
      text: provider.clone(),
      enhancer: provider.clone(),
      image: provider,
    }
  }

  /// Providers that fail every call. Useful for workflows that never reach
  /// a generative node.
  pub fn unconfigured() -> Self {
    Self::from_single(Arc::new(Unconfigured))
  }
}

struct Unconfigured;

const UNCONFIGURED: &str = "no provider configured";

#[async_trait]
impl TextGenerator for Unconfigured {
  async fn generate_text(&self, _: &str, _: Option<&str>) -> Result<String, GenerationError> {
    Err(GenerationError::Provider(UNCONFIGURED.to_string()))
  }
}

#[async_trait]
impl PromptEnhancer for Unconfigured {
  async fn enhance_prompt(&self, _: &str) -> Result<EnhancedPrompt, GenerationError> {
    Err(GenerationError::Provider(UNCONFIGURED.to_string()))
  }
}

#[async_trait]
impl ImageGenerator for Unconfigured {
  async fn generate_image(
    &self,
    _: &str,
    _: &str,
    _: Option<&str>,
  ) -> Result<Vec<String>, GenerationError> {
    Err(GenerationError::Provider(UNCONFIGURED.to_string()))
  }
}
