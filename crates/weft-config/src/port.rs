use serde::{Deserialize, Serialize};

/// The kind of value a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
  Text,
  Image,
  Number,
  Boolean,
  Object,
  Array,
  #[default]
  Any,
}

/// A named input or output port on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDef {
  pub name: String,
  #[serde(default)]
  pub kind: ValueKind,
  #[serde(default)]
  pub required: bool,
}

impl PortDef {
  /// An optional port.
  pub fn optional(name: impl Into<String>, kind: ValueKind) -> Self {
    Self {
      name: name.into(),
      kind,
      required: false,
    }
  }

  /// A port that must receive a value before the node is dispatched.
  pub fn required(name: impl Into<String>, kind: ValueKind) -> Self {
    Self {
      name: name.into(),
      kind,
      required: true,
    }
  }
}
