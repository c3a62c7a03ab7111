use serde::{Deserialize, Serialize};
use weft_config::{NodeDef, NodeKind, PortDef};

/// A node in a locked workflow. Ports are always resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: String,
  pub kind: NodeKind,
  pub config: serde_json::Value,
  pub inputs: Vec<PortDef>,
  pub outputs: Vec<PortDef>,
  pub cache_key: Option<String>,
}

impl Node {
  pub fn input_port(&self, name: &str) -> Option<&PortDef> {
    self.inputs.iter().find(|p| p.name == name)
  }

  pub fn output_port(&self, name: &str) -> Option<&PortDef> {
    self.outputs.iter().find(|p| p.name == name)
  }

  /// Names of input ports flagged as required.
  pub fn required_inputs(&self) -> impl Iterator<Item = &str> {
    self
      .inputs
      .iter()
      .filter(|p| p.required)
      .map(|p| p.name.as_str())
  }
}

impl From<NodeDef> for Node {
  /// A definition with neither inputs nor outputs declared gets the default
  /// ports of its kind; otherwise the declared ports are taken as-is.
  fn from(def: NodeDef) -> Self {
    let (inputs, outputs) = match (def.inputs, def.outputs) {
      (None, None) => (def.kind.default_inputs(), def.kind.default_outputs()),
      (inputs, outputs) => (inputs.unwrap_or_default(), outputs.unwrap_or_default()),
    };

    Self {
      id: def.id,
      kind: def.kind,
      config: def.config,
      inputs,
      outputs,
      cache_key: def.cache_key,
    }
  }
}
