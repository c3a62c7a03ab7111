use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("duplicate node id: {0}")]
  DuplicateNode(String),

  #[error("node not found: {0}")]
  NodeNotFound(String),

  #[error("edge '{edge_id}' references unknown node '{node_id}'")]
  InvalidEdge { edge_id: String, node_id: String },

  #[error("edge '{edge_id}' references unknown {direction} port '{port}' on node '{node_id}'")]
  UnknownPort {
    edge_id: String,
    node_id: String,
    port: String,
    direction: PortDirection,
  },

  /// Some nodes never reach in-degree zero, so no layer can hold them.
  #[error("cycle detected: nodes {nodes:?} can never be scheduled")]
  CycleDetected { nodes: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
  Input,
  Output,
}

impl std::fmt::Display for PortDirection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PortDirection::Input => f.write_str("input"),
      PortDirection::Output => f.write_str("output"),
    }
  }
}
