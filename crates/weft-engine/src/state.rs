//! Per-run execution state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
  Running,
  Completed,
  Failed,
  Cancelled,
}

impl ExecutionStatus {
  pub fn is_terminal(&self) -> bool {
    !matches!(self, ExecutionStatus::Running)
  }
}

/// Status of a single node within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
  #[default]
  Idle,
  Running,
  Completed,
  Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
  pub status: NodeStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub execution_time_ms: Option<u64>,
  /// The value came from the result cache rather than the handler.
  #[serde(default)]
  pub cached: bool,
}

/// Snapshot of a workflow run.
///
/// `status` is `Completed` whenever every layer ran, even if some nodes
/// failed; inspect `errors` for node-level failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionState {
  pub workflow_id: String,
  pub execution_id: String,
  pub status: ExecutionStatus,
  /// Percentage of layers started, 0 to 100.
  pub progress: f64,
  /// Node ids of the layer currently executing.
  pub current_nodes: Vec<String>,
  /// Output value per node id, seeded with the initial inputs.
  pub results: Map<String, Value>,
  /// Error message per failed node id.
  pub errors: BTreeMap<String, String>,
  pub nodes: BTreeMap<String, NodeState>,
  /// Workflow-level error for failed or cancelled runs.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub started_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ended_at: Option<DateTime<Utc>>,
}

impl ExecutionState {
  pub(crate) fn new<'a>(
    workflow_id: impl Into<String>,
    execution_id: impl Into<String>,
    node_ids: impl IntoIterator<Item = &'a String>,
    initial_inputs: Map<String, Value>,
  ) -> Self {
    Self {
      workflow_id: workflow_id.into(),
      execution_id: execution_id.into(),
      status: ExecutionStatus::Running,
      progress: 0.0,
      current_nodes: Vec::new(),
      results: initial_inputs,
      errors: BTreeMap::new(),
      nodes: node_ids
        .into_iter()
        .map(|id| (id.clone(), NodeState::default()))
        .collect(),
      error: None,
      started_at: Utc::now(),
      ended_at: None,
    }
  }

  pub fn is_terminal(&self) -> bool {
    self.status.is_terminal()
  }

  /// Move to a terminal status.
  pub(crate) fn finish(&mut self, status: ExecutionStatus, error: Option<String>) {
    self.status = status;
    self.error = error;
    self.current_nodes.clear();
    if status == ExecutionStatus::Completed {
      self.progress = 100.0;
    }
    self.ended_at = Some(Utc::now());
  }
}
