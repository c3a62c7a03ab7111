use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TaskError;
use crate::handler::NodeHandler;
use crate::providers::TextGenerator;
use crate::template::render_prompt;
use crate::types::{TaskContext, value_text};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmConfig {
  #[serde(default)]
  user_prompt: Option<String>,
  #[serde(default)]
  system_prompt: Option<String>,
  #[serde(default)]
  model: Option<String>,
}

/// Builds a prompt from config and inputs, then asks the text provider for
/// a completion.
pub struct LlmProcessorHandler {
  text: Arc<dyn TextGenerator>,
}

impl LlmProcessorHandler {
  pub fn new(text: Arc<dyn TextGenerator>) -> Self {
    Self { text }
  }
}

/// Assemble the final prompt.
///
/// A non-empty `userPrompt` is templated against the inputs. Without one the
/// `context` input is used as the prompt. A system prompt is prepended,
/// separated by a blank line.
fn build_prompt(config: &LlmConfig, ctx: &TaskContext) -> Result<String, TaskError> {
  let user = match config.user_prompt.as_deref() {
    Some(template) if !template.is_empty() => render_prompt(template, &ctx.inputs),
    _ => match ctx.input("context") {
      Some(context) => value_text(context),
      None => {
        return Err(TaskError::invalid_config(
          "userPrompt",
          "no user prompt configured and no context input",
        ));
      }
    },
  };

  Ok(match config.system_prompt.as_deref() {
    Some(system) if !system.is_empty() => format!("{system}\n\n{user}"),
    _ => user,
  })
}

#[async_trait]
impl NodeHandler for LlmProcessorHandler {
  async fn execute(
    &self,
    ctx: &TaskContext,
    cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    let config: LlmConfig = ctx.parse_config()?;
    let prompt = build_prompt(&config, ctx)?;

    debug!(
      node_id = %ctx.node_id,
      prompt_len = prompt.len(),
      "llm_prompt_built"
    );

    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(TaskError::Cancelled),
      result = self.text.generate_text(&prompt, config.model.as_deref()) => {
        Ok(Value::String(result?))
      }
    }
  }
}
