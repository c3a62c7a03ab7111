use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::handler::NodeHandler;
use crate::types::TaskContext;

/// Emits `config.defaultValue`, or an empty string when it is not set.
#[derive(Debug, Default)]
pub struct TextInputHandler;

#[async_trait]
impl NodeHandler for TextInputHandler {
  async fn execute(
    &self,
    ctx: &TaskContext,
    _cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    Ok(
      ctx
        .config
        .get("defaultValue")
        .cloned()
        .unwrap_or_else(|| Value::String(String::new())),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{Map, json};

  #[tokio::test]
  async fn test_returns_default_value() {
    let ctx = TaskContext::new("exec", "n", json!({ "defaultValue": "hello" }), Map::new());
    let value = TextInputHandler
      .execute(&ctx, &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(value, json!("hello"));
  }

  #[tokio::test]
  async fn test_missing_default_is_empty_string() {
    let ctx = TaskContext::new("exec", "n", json!({}), Map::new());
    let value = TextInputHandler
      .execute(&ctx, &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(value, json!(""));
  }
}
