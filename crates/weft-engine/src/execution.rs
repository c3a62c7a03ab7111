//! Handles to in-flight runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::state::{ExecutionState, ExecutionStatus};

/// Control and live state of a run, as tracked by the engine.
#[derive(Clone)]
pub(crate) struct LiveExecution {
  pub(crate) cancel: CancellationToken,
  pub(crate) state: Arc<RwLock<ExecutionState>>,
}

pub(crate) type LiveExecutions = Arc<Mutex<HashMap<String, LiveExecution>>>;

pub(crate) fn read_state(state: &RwLock<ExecutionState>) -> ExecutionState {
  state.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// A workflow run in progress.
///
/// Dropping the handle does not stop the run; use
/// [`WorkflowExecution::abort`] or [`crate::WorkflowEngine::abort`].
pub struct WorkflowExecution {
  execution_id: String,
  live: LiveExecution,
  handle: JoinHandle<ExecutionState>,
  executions: LiveExecutions,
}

impl WorkflowExecution {
  pub(crate) fn new(
    execution_id: String,
    live: LiveExecution,
    handle: JoinHandle<ExecutionState>,
    executions: LiveExecutions,
  ) -> Self {
    Self {
      execution_id,
      live,
      handle,
      executions,
    }
  }

  pub fn execution_id(&self) -> &str {
    &self.execution_id
  }

  /// Current state of the run.
  pub fn snapshot(&self) -> ExecutionState {
    read_state(&self.live.state)
  }

  /// Request cancellation. Takes effect at the next layer boundary and in
  /// any handler that is watching the token.
  pub fn abort(&self) {
    self.live.cancel.cancel();
  }

  /// Wait for the run to reach a terminal state.
  pub async fn wait(self) -> ExecutionState {
    match self.handle.await {
      Ok(state) => state,
      Err(e) => {
        error!(
          execution_id = %self.execution_id,
          error = %e,
          "workflow_task_failed"
        );
        self
          .executions
          .lock()
          .unwrap_or_else(|e| e.into_inner())
          .remove(&self.execution_id);

        let mut state = self.live.state.write().unwrap_or_else(|e| e.into_inner());
        if !state.is_terminal() {
          state.finish(
            ExecutionStatus::Failed,
            Some(format!("execution task failed: {e}")),
          );
        }
        state.clone()
      }
    }
  }
}
