//! Single-node execution: cache lookup, input validation and handler call.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use weft_task::{HandlerRegistry, TaskContext};
use weft_workflow::Node;

use crate::cache::ResultCache;
use crate::error::ExecutionError;
use crate::input::missing_required;

/// Output of one dispatched node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutput {
  pub value: Value,
  pub cached: bool,
}

/// Runs nodes through the handler registry, memoizing by cache key.
#[derive(Clone)]
pub struct Dispatcher {
  registry: Arc<HandlerRegistry>,
  cache: ResultCache,
}

impl Dispatcher {
  pub fn new(registry: Arc<HandlerRegistry>, cache: ResultCache) -> Self {
    Self { registry, cache }
  }

  /// Execute one node with already-resolved inputs.
  ///
  /// A node with a `cache_key` that hits is answered from the cache before
  /// its inputs are checked. Only successful outputs are cached.
  pub async fn dispatch(
    &self,
    node: &Node,
    inputs: Map<String, Value>,
    execution_id: &str,
    cancel: &CancellationToken,
  ) -> Result<NodeOutput, ExecutionError> {
    if let Some(key) = &node.cache_key {
      if let Some(value) = self.cache.get(key) {
        debug!(node_id = %node.id, cache_key = %key, "cache_hit");
        return Ok(NodeOutput {
          value,
          cached: true,
        });
      }
    }

    if let Some(port) = missing_required(node, &inputs) {
      return Err(ExecutionError::MissingInput {
        node_id: node.id.clone(),
        port: port.to_string(),
      });
    }

    let ctx = TaskContext::new(execution_id, node.id.clone(), node.config.clone(), inputs);
    let value = self
      .registry
      .execute(&node.kind, &ctx, cancel)
      .await
      .map_err(|source| ExecutionError::Node {
        node_id: node.id.clone(),
        source,
      })?;

    if let Some(key) = &node.cache_key {
      self.cache.put(key.clone(), value.clone());
    }

    Ok(NodeOutput {
      value,
      cached: false,
    })
  }
}
