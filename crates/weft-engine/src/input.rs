//! Input resolution from upstream results.

use serde_json::{Map, Value};
use weft_workflow::{Node, Workflow};

/// Bind upstream results to a node's input ports.
///
/// Edges are applied in declaration order, so when several edges feed the
/// same port the last one with a result wins. Ports whose upstream has no
/// result are left absent.
pub fn resolve_inputs(
  workflow: &Workflow,
  node_id: &str,
  results: &Map<String, Value>,
) -> Map<String, Value> {
  let mut inputs = Map::new();
  for edge in workflow.graph().input_edges(node_id) {
    if let Some(value) = results.get(&edge.source) {
      inputs.insert(edge.target_handle.clone(), value.clone());
    }
  }
  inputs
}

/// The first required input port with no value.
pub fn missing_required<'a>(node: &'a Node, inputs: &Map<String, Value>) -> Option<&'a str> {
  node
    .required_inputs()
    .find(|port| !inputs.contains_key(*port))
}
