use serde::{Deserialize, Serialize};

/// A directed binding from one node's output port to another node's input port.
///
/// Edges carry no value; they only describe routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDef {
  pub id: String,
  pub source: String,
  pub source_handle: String,
  pub target: String,
  pub target_handle: String,
}

impl EdgeDef {
  pub fn new(
    id: impl Into<String>,
    source: impl Into<String>,
    source_handle: impl Into<String>,
    target: impl Into<String>,
    target_handle: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      source: source.into(),
      source_handle: source_handle.into(),
      target: target.into(),
      target_handle: target_handle.into(),
    }
  }
}
