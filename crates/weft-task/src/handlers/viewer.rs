use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::handler::NodeHandler;
use crate::types::TaskContext;

/// Terminal display node; returns `data` unchanged.
#[derive(Debug, Default)]
pub struct ViewerHandler;

#[async_trait]
impl NodeHandler for ViewerHandler {
  async fn execute(
    &self,
    ctx: &TaskContext,
    _cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    ctx.require_input("data").cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{Map, json};

  #[tokio::test]
  async fn test_passes_data_through() {
    let mut inputs = Map::new();
    inputs.insert("data".to_string(), json!({ "k": [1, 2] }));
    let ctx = TaskContext::new("exec", "view", json!({}), inputs);

    let value = ViewerHandler
      .execute(&ctx, &CancellationToken::new())
      .await
      .unwrap();
    assert_eq!(value, json!({ "k": [1, 2] }));
  }

  #[tokio::test]
  async fn test_missing_data_fails() {
    let ctx = TaskContext::new("exec", "view", json!({}), Map::new());
    let err = ViewerHandler
      .execute(&ctx, &CancellationToken::new())
      .await
      .unwrap_err();
    assert!(matches!(err, TaskError::MissingInput { port } if port == "data"));
  }
}
