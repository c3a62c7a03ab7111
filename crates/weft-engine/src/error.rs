use thiserror::Error;
use weft_task::TaskError;
use weft_workflow::WorkflowError;

/// Errors raised while executing a workflow or one of its nodes.
#[derive(Debug, Error)]
pub enum ExecutionError {
  /// A node's handler failed. Displays as the handler's own message since
  /// the node id is recorded alongside it.
  #[error("{source}")]
  Node {
    node_id: String,
    #[source]
    source: TaskError,
  },

  #[error("missing required input: {port}")]
  MissingInput { node_id: String, port: String },

  #[error("scheduling failed: {0}")]
  Scheduling(#[from] WorkflowError),

  #[error("execution cancelled")]
  Cancelled,

  /// A spawned node task panicked or was aborted.
  #[error("node task failed: {message}")]
  TaskJoin { node_id: String, message: String },

  #[error("node not found: {0}")]
  NodeNotFound(String),
}

impl ExecutionError {
  /// The node the error belongs to, if it is node-scoped.
  pub fn node_id(&self) -> Option<&str> {
    match self {
      ExecutionError::Node { node_id, .. }
      | ExecutionError::MissingInput { node_id, .. }
      | ExecutionError::TaskJoin { node_id, .. }
      | ExecutionError::NodeNotFound(node_id) => Some(node_id.as_str()),
      ExecutionError::Scheduling(_) | ExecutionError::Cancelled => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_node_scoped_errors_carry_node_id() {
    let err = ExecutionError::Node {
      node_id: "llm".to_string(),
      source: TaskError::missing_input("context"),
    };
    assert_eq!(err.node_id(), Some("llm"));
    assert_eq!(err.to_string(), "missing required input: context");

    let err = ExecutionError::MissingInput {
      node_id: "viewer".to_string(),
      port: "data".to_string(),
    };
    assert_eq!(err.node_id(), Some("viewer"));
  }

  #[test]
  fn test_run_level_errors_have_no_node_id() {
    assert_eq!(ExecutionError::Cancelled.node_id(), None);
    let err = ExecutionError::Scheduling(WorkflowError::CycleDetected {
      nodes: vec!["a".to_string()],
    });
    assert_eq!(err.node_id(), None);
  }
}
