use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::handler::NodeHandler;
use crate::types::TaskContext;

/// Passes `items` through unchanged. Fan-out over the items is left to
/// downstream nodes.
#[derive(Debug, Default)]
pub struct LoopHandler;

#[async_trait]
impl NodeHandler for LoopHandler {
  async fn execute(
    &self,
    ctx: &TaskContext,
    _cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    ctx.require_input("items").cloned()
  }
}
