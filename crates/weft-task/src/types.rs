use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::TaskError;

/// Context provided to a node handler during execution.
#[derive(Debug, Clone)]
pub struct TaskContext {
  /// Workflow execution ID.
  pub execution_id: String,

  /// Node ID within the workflow.
  pub node_id: String,

  /// The node's per-type configuration.
  pub config: Value,

  /// Resolved input values keyed by input port name. Ports with no value
  /// are absent.
  pub inputs: Map<String, Value>,
}

impl TaskContext {
  pub fn new(
    execution_id: impl Into<String>,
    node_id: impl Into<String>,
    config: Value,
    inputs: Map<String, Value>,
  ) -> Self {
    Self {
      execution_id: execution_id.into(),
      node_id: node_id.into(),
      config,
      inputs,
    }
  }

  pub fn input(&self, port: &str) -> Option<&Value> {
    self.inputs.get(port)
  }

  /// The input for `port`, or a [`TaskError::MissingInput`].
  pub fn require_input(&self, port: &str) -> Result<&Value, TaskError> {
    self.input(port).ok_or_else(|| TaskError::missing_input(port))
  }

  /// Deserialize the config into a handler's typed view of it.
  ///
  /// A null config is read as an empty object.
  pub fn parse_config<T: DeserializeOwned>(&self) -> Result<T, TaskError> {
    let config = match &self.config {
      Value::Null => Value::Object(Map::new()),
      other => other.clone(),
    };
    serde_json::from_value(config).map_err(|e| TaskError::invalid_config("config", e.to_string()))
  }
}

/// Text form of a value: strings as-is, everything else as JSON.
pub(crate) fn value_text(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}
