use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::TaskError;
use crate::handler::NodeHandler;
use crate::providers::{GenerationError, ImageGenerator, PromptEnhancer};
use crate::types::{TaskContext, value_text};

const DEFAULT_ASPECT_RATIO: &str = "1:1";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
  #[serde(default)]
  prompt: Option<String>,
  #[serde(default)]
  prompt_enhancement: bool,
  #[serde(default)]
  aspect_ratio: Option<String>,
  #[serde(default)]
  model: Option<String>,
}

/// Generates an image from the `prompt` input (or configured prompt),
/// optionally rewriting the prompt first.
pub struct ImageGeneratorHandler {
  enhancer: Arc<dyn PromptEnhancer>,
  image: Arc<dyn ImageGenerator>,
}

impl ImageGeneratorHandler {
  pub fn new(enhancer: Arc<dyn PromptEnhancer>, image: Arc<dyn ImageGenerator>) -> Self {
    Self { enhancer, image }
  }

  async fn enhance(
    &self,
    ctx: &TaskContext,
    prompt: String,
    cancel: &CancellationToken,
  ) -> Result<String, TaskError> {
    let result = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(TaskError::Cancelled),
      result = self.enhancer.enhance_prompt(&prompt) => result,
    };

    match result {
      Ok(enhanced) => {
        debug!(node_id = %ctx.node_id, "prompt_enhanced");
        Ok(enhanced.final_prompt)
      }
      Err(e) => {
        warn!(
          node_id = %ctx.node_id,
          error = %e,
          "prompt_enhancement_failed"
        );
        Ok(prompt)
      }
    }
  }
}

fn resolve_prompt(config: &ImageConfig, ctx: &TaskContext) -> Result<String, TaskError> {
  let from_input = ctx
    .input("prompt")
    .filter(|v| !v.is_null())
    .map(value_text)
    .filter(|p| !p.is_empty());

  from_input
    .or_else(|| config.prompt.clone().filter(|p| !p.is_empty()))
    .ok_or_else(|| TaskError::invalid_config("prompt", "no prompt input and no configured prompt"))
}

#[async_trait]
impl NodeHandler for ImageGeneratorHandler {
  async fn execute(
    &self,
    ctx: &TaskContext,
    cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    let config: ImageConfig = ctx.parse_config()?;
    let mut prompt = resolve_prompt(&config, ctx)?;

    if config.prompt_enhancement {
      prompt = self.enhance(ctx, prompt, cancel).await?;
    }

    let aspect_ratio = config
      .aspect_ratio
      .as_deref()
      .unwrap_or(DEFAULT_ASPECT_RATIO);

    let images = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(TaskError::Cancelled),
      result = self.image.generate_image(&prompt, aspect_ratio, config.model.as_deref()) => result?,
    };

    images
      .into_iter()
      .next()
      .map(Value::String)
      .ok_or(TaskError::Generation(GenerationError::Empty))
  }
}
