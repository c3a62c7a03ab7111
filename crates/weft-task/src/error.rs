use thiserror::Error;

use crate::providers::GenerationError;

/// Errors raised by a single node's logic.
#[derive(Debug, Error)]
pub enum TaskError {
  /// An input the node needs did not receive a value.
  #[error("missing required input: {port}")]
  MissingInput { port: String },

  /// The node's config is missing a field or has a bad value.
  #[error("invalid config '{field}': {message}")]
  InvalidConfig { field: String, message: String },

  /// A text or image provider failed.
  #[error("generation failed: {0}")]
  Generation(#[from] GenerationError),

  /// An HTTP call timed out, failed to connect, or returned a bad response.
  #[error("API call failed: {message}")]
  ApiCall { message: String },

  #[error("execution cancelled")]
  Cancelled,

  #[error("no handler registered for node type '{0}'")]
  UnknownNodeType(String),
}

impl TaskError {
  pub fn missing_input(port: impl Into<String>) -> Self {
    Self::MissingInput { port: port.into() }
  }

  pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidConfig {
      field: field.into(),
      message: message.into(),
    }
  }

  pub fn api_call(message: impl Into<String>) -> Self {
    Self::ApiCall {
      message: message.into(),
    }
  }
}
