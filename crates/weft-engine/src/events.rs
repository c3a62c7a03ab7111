//! Execution events and notifiers for observability.
//!
//! The engine emits events as a run progresses so consumers can render
//! progress, persist state or stream to UIs.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted during workflow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
  WorkflowStarted {
    execution_id: String,
    workflow_id: String,
  },

  /// A layer is about to run. `progress` is the percentage of layers
  /// started, this one included.
  LayerStarted {
    execution_id: String,
    index: usize,
    node_ids: Vec<String>,
    progress: f64,
  },

  NodeStarted {
    execution_id: String,
    node_id: String,
  },

  NodeCompleted {
    execution_id: String,
    node_id: String,
    data: serde_json::Value,
    /// Served from the result cache.
    cached: bool,
  },

  NodeFailed {
    execution_id: String,
    node_id: String,
    error: String,
  },

  /// Every layer ran. Individual nodes may still have failed.
  WorkflowCompleted { execution_id: String },

  WorkflowFailed { execution_id: String, error: String },

  WorkflowCancelled { execution_id: String },
}

/// Receives execution events.
///
/// Called inline by the engine, so implementations should not block.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Sends events to an unbounded channel.
///
/// Unbounded so a slow consumer never stalls the engine; volume is a few
/// events per node.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }

  /// A notifier together with the receiving end of its channel.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExecutionEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}
