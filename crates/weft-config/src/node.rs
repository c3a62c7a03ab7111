use std::fmt;

use serde::{Deserialize, Serialize};

use crate::port::{PortDef, ValueKind};

/// The type of a node, serialized as its type tag (e.g. `"llm_processor"`).
///
/// Unknown tags deserialize to [`NodeKind::Custom`] so that hosts can register
/// handlers for their own node types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
  TextInput,
  LlmProcessor,
  ImageGenerator,
  Condition,
  Loop,
  ApiCall,
  Viewer,
  Custom(String),
}

impl NodeKind {
  /// The type tag handlers are registered under.
  pub fn as_str(&self) -> &str {
    match self {
      NodeKind::TextInput => "text_input",
      NodeKind::LlmProcessor => "llm_processor",
      NodeKind::ImageGenerator => "image_generator",
      NodeKind::Condition => "condition",
      NodeKind::Loop => "loop",
      NodeKind::ApiCall => "api_call",
      NodeKind::Viewer => "viewer",
      NodeKind::Custom(tag) => tag,
    }
  }

  /// Input ports a node of this kind has when its definition declares none.
  pub fn default_inputs(&self) -> Vec<PortDef> {
    match self {
      NodeKind::TextInput | NodeKind::Custom(_) => vec![],
      NodeKind::LlmProcessor => vec![PortDef::optional("context", ValueKind::Text)],
      NodeKind::ImageGenerator => vec![PortDef::optional("prompt", ValueKind::Text)],
      NodeKind::Condition => vec![PortDef::required("input", ValueKind::Any)],
      NodeKind::Loop => vec![PortDef::required("items", ValueKind::Array)],
      NodeKind::ApiCall => vec![PortDef::optional("payload", ValueKind::Object)],
      NodeKind::Viewer => vec![PortDef::required("data", ValueKind::Any)],
    }
  }

  /// Output ports a node of this kind has when its definition declares none.
  ///
  /// The condition node declares `true` and `false` ports but produces a
  /// single value; both ports carry it.
  pub fn default_outputs(&self) -> Vec<PortDef> {
    match self {
      NodeKind::TextInput | NodeKind::LlmProcessor => {
        vec![PortDef::optional("text", ValueKind::Text)]
      }
      NodeKind::ImageGenerator => vec![PortDef::optional("image", ValueKind::Image)],
      NodeKind::Condition => vec![
        PortDef::optional("true", ValueKind::Any),
        PortDef::optional("false", ValueKind::Any),
      ],
      NodeKind::Loop => vec![PortDef::optional("items", ValueKind::Array)],
      NodeKind::ApiCall => vec![PortDef::optional("response", ValueKind::Object)],
      NodeKind::Viewer | NodeKind::Custom(_) => vec![],
    }
  }
}

impl From<String> for NodeKind {
  fn from(tag: String) -> Self {
    match tag.as_str() {
      "text_input" => NodeKind::TextInput,
      "llm_processor" => NodeKind::LlmProcessor,
      "image_generator" => NodeKind::ImageGenerator,
      "condition" => NodeKind::Condition,
      "loop" => NodeKind::Loop,
      "api_call" => NodeKind::ApiCall,
      "viewer" => NodeKind::Viewer,
      _ => NodeKind::Custom(tag),
    }
  }
}

impl From<NodeKind> for String {
  fn from(kind: NodeKind) -> Self {
    kind.as_str().to_string()
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A node as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: NodeKind,
  /// Per-type configuration, kept opaque here.
  #[serde(default = "empty_config")]
  pub config: serde_json::Value,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inputs: Option<Vec<PortDef>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub outputs: Option<Vec<PortDef>>,
  /// User-assigned memoization key, independent of the node id.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cache_key: Option<String>,
}

impl NodeDef {
  /// A node with the default ports of its kind and the given config.
  pub fn new(id: impl Into<String>, kind: NodeKind, config: serde_json::Value) -> Self {
    Self {
      id: id.into(),
      kind,
      config,
      inputs: None,
      outputs: None,
      cache_key: None,
    }
  }

  pub fn with_inputs(mut self, inputs: Vec<PortDef>) -> Self {
    self.inputs = Some(inputs);
    self
  }

  pub fn with_outputs(mut self, outputs: Vec<PortDef>) -> Self {
    self.outputs = Some(outputs);
    self
  }

  pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
    self.cache_key = Some(key.into());
    self
  }
}

fn empty_config() -> serde_json::Value {
  serde_json::Value::Object(serde_json::Map::new())
}
