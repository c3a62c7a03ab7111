use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use weft_config::NodeKind;

use crate::error::TaskError;
use crate::handlers::{
  ApiCallHandler, ConditionHandler, ImageGeneratorHandler, LlmProcessorHandler, LoopHandler,
  TextInputHandler, ViewerHandler,
};
use crate::providers::Providers;
use crate::types::TaskContext;

/// Executes one node type.
///
/// Handlers must stop promptly once `cancel` fires, returning
/// [`TaskError::Cancelled`].
#[async_trait]
pub trait NodeHandler: Send + Sync {
  async fn execute(&self, ctx: &TaskContext, cancel: &CancellationToken)
  -> Result<Value, TaskError>;
}

/// Node handlers keyed by type tag.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
  handlers: HashMap<String, Arc<dyn NodeHandler>>,
}

impl HandlerRegistry {
  /// An empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry with a handler for every built-in node type.
  pub fn with_builtin(providers: Providers) -> Self {
    let mut registry = Self::new();
    registry.register(NodeKind::TextInput, TextInputHandler);
    registry.register(
      NodeKind::LlmProcessor,
      LlmProcessorHandler::new(providers.text.clone()),
    );
    registry.register(
      NodeKind::ImageGenerator,
      ImageGeneratorHandler::new(providers.enhancer.clone(), providers.image.clone()),
    );
    registry.register(NodeKind::Condition, ConditionHandler);
    registry.register(NodeKind::Loop, LoopHandler);
    registry.register(NodeKind::ApiCall, ApiCallHandler::new());
    registry.register(NodeKind::Viewer, ViewerHandler);
    registry
  }

  /// Register (or replace) the handler for a node type.
  pub fn register(&mut self, kind: impl Into<NodeKind>, handler: impl NodeHandler + 'static) {
    self
      .handlers
      .insert(kind.into().as_str().to_string(), Arc::new(handler));
  }

  pub fn get(&self, kind: &NodeKind) -> Option<Arc<dyn NodeHandler>> {
    self.handlers.get(kind.as_str()).cloned()
  }

  pub fn contains(&self, kind: &NodeKind) -> bool {
    self.handlers.contains_key(kind.as_str())
  }

  /// Run the handler registered for `kind`.
  pub async fn execute(
    &self,
    kind: &NodeKind,
    ctx: &TaskContext,
    cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    let handler = self
      .get(kind)
      .ok_or_else(|| TaskError::UnknownNodeType(kind.to_string()))?;
    handler.execute(ctx, cancel).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{Map, json};

  struct Upper;

  #[async_trait]
  impl NodeHandler for Upper {
    async fn execute(
      &self,
      ctx: &TaskContext,
      _cancel: &CancellationToken,
    ) -> Result<Value, TaskError> {
      let text = ctx.require_input("text")?.as_str().unwrap_or_default();
      Ok(Value::String(text.to_uppercase()))
    }
  }

  #[test]
  fn test_builtin_covers_every_kind() {
    let registry = HandlerRegistry::with_builtin(Providers::unconfigured());
    for tag in [
      "text_input",
      "llm_processor",
      "image_generator",
      "condition",
      "loop",
      "api_call",
      "viewer",
    ] {
      assert!(registry.contains(&NodeKind::from(tag.to_string())), "{tag}");
    }
  }

  #[tokio::test]
  async fn test_custom_handler_by_tag() {
    let mut registry = HandlerRegistry::new();
    registry.register("shout".to_string(), Upper);

    let mut inputs = Map::new();
    inputs.insert("text".to_string(), json!("hi"));
    let ctx = TaskContext::new("exec", "n", json!({}), inputs);

    let kind = NodeKind::Custom("shout".to_string());
    let value = registry
      .execute(&kind, &ctx, &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(value, json!("HI"));
  }

  #[tokio::test]
  async fn test_unknown_type() {
    let registry = HandlerRegistry::new();
    let ctx = TaskContext::new("exec", "n", json!({}), Map::new());

    let err = registry
      .execute(&NodeKind::Viewer, &ctx, &CancellationToken::new())
      .await
      .unwrap_err();
    assert!(matches!(err, TaskError::UnknownNodeType(tag) if tag == "viewer"));
  }
}
