//! Layered workflow execution.
//!
//! A run walks the workflow's topological layers in order. Every node of a
//! layer is spawned as its own task and the layer is awaited as a barrier, so
//! one failing node never stops its siblings. Failures are recorded per node
//! and the run carries on; dependents of a failed node see its input absent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use futures::future::join_all;
use serde_json::{Map, Value};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, instrument, warn};
use weft_task::HandlerRegistry;
use weft_workflow::Workflow;

use crate::cache::ResultCache;
use crate::config::EngineConfig;
use crate::dispatcher::{Dispatcher, NodeOutput};
use crate::error::ExecutionError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::execution::{LiveExecution, LiveExecutions, WorkflowExecution, read_state};
use crate::input::resolve_inputs;
use crate::state::{ExecutionState, ExecutionStatus, NodeState, NodeStatus};

/// The workflow execution engine.
///
/// Cloning is cheap; clones share the result cache and the set of live runs.
/// Generic over `N: ExecutionNotifier` so callers choose how events are
/// observed. [`WorkflowEngine::new`] discards them.
pub struct WorkflowEngine<N: ExecutionNotifier = NoopNotifier> {
  dispatcher: Dispatcher,
  cache: ResultCache,
  config: EngineConfig,
  notifier: Arc<N>,
  executions: LiveExecutions,
}

impl<N: ExecutionNotifier> Clone for WorkflowEngine<N> {
  fn clone(&self) -> Self {
    Self {
      dispatcher: self.dispatcher.clone(),
      cache: self.cache.clone(),
      config: self.config.clone(),
      notifier: self.notifier.clone(),
      executions: self.executions.clone(),
    }
  }
}

impl WorkflowEngine<NoopNotifier> {
  /// Create an engine with no-op notifications.
  pub fn new(config: EngineConfig, registry: HandlerRegistry) -> Self {
    Self::with_notifier(config, registry, NoopNotifier)
  }
}

impl<N: ExecutionNotifier + 'static> WorkflowEngine<N> {
  /// Create an engine with a custom notifier.
  pub fn with_notifier(config: EngineConfig, registry: HandlerRegistry, notifier: N) -> Self {
    let cache = ResultCache::new(config.cache_ttl);
    Self {
      dispatcher: Dispatcher::new(Arc::new(registry), cache.clone()),
      cache,
      config,
      notifier: Arc::new(notifier),
      executions: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// The result cache shared by all runs of this engine.
  pub fn cache(&self) -> &ResultCache {
    &self.cache
  }

  /// Start a run in the background.
  ///
  /// `initial_inputs` maps node ids to values and seeds the run's results,
  /// so nodes downstream of those ids see them as upstream output. Must be
  /// called from within a tokio runtime.
  pub fn execute(
    &self,
    workflow: impl Into<Arc<Workflow>>,
    initial_inputs: Map<String, Value>,
  ) -> WorkflowExecution {
    let workflow = workflow.into();
    let execution_id = uuid::Uuid::new_v4().to_string();

    let live = LiveExecution {
      cancel: CancellationToken::new(),
      state: Arc::new(RwLock::new(ExecutionState::new(
        &workflow.workflow_id,
        &execution_id,
        workflow.graph().node_ids(),
        initial_inputs,
      ))),
    };
    self
      .executions
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .insert(execution_id.clone(), live.clone());

    let run = Run {
      engine: self.clone(),
      workflow,
      execution_id: execution_id.clone(),
      live: live.clone(),
    };
    let handle = tokio::spawn(run.execute());

    WorkflowExecution::new(execution_id, live, handle, self.executions.clone())
  }

  /// Run a workflow to completion and return its terminal state.
  pub async fn run(
    &self,
    workflow: impl Into<Arc<Workflow>>,
    initial_inputs: Map<String, Value>,
  ) -> ExecutionState {
    self.execute(workflow, initial_inputs).wait().await
  }

  /// Request cancellation of a live run.
  ///
  /// Returns whether a live run with that id was found. Unknown or finished
  /// runs are left alone, so calling this repeatedly is harmless.
  pub fn abort(&self, execution_id: &str) -> bool {
    let executions = self.executions.lock().unwrap_or_else(|e| e.into_inner());
    match executions.get(execution_id) {
      Some(live) => {
        info!(execution_id, "workflow_abort_requested");
        live.cancel.cancel();
        true
      }
      None => false,
    }
  }

  /// Current state of a live run. `None` once the run has finished.
  pub fn snapshot(&self, execution_id: &str) -> Option<ExecutionState> {
    let executions = self.executions.lock().unwrap_or_else(|e| e.into_inner());
    executions
      .get(execution_id)
      .map(|live| read_state(&live.state))
  }

  /// Ids of runs that have not finished yet.
  pub fn live_executions(&self) -> Vec<String> {
    let executions = self.executions.lock().unwrap_or_else(|e| e.into_inner());
    executions.keys().cloned().collect()
  }

  /// Execute a single node in isolation with the given inputs.
  ///
  /// Bypasses graph traversal; the cache and required-input checks still
  /// apply.
  pub async fn execute_node(
    &self,
    workflow: &Workflow,
    node_id: &str,
    inputs: Map<String, Value>,
    cancel: CancellationToken,
  ) -> Result<NodeOutput, ExecutionError> {
    let node = workflow
      .get_node(node_id)
      .ok_or_else(|| ExecutionError::NodeNotFound(node_id.to_string()))?;
    let execution_id = uuid::Uuid::new_v4().to_string();

    info!(execution_id = %execution_id, node_id, "node_run_started");
    self
      .dispatcher
      .dispatch(node, inputs, &execution_id, &cancel)
      .await
  }

  fn forget(&self, execution_id: &str) {
    self
      .executions
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .remove(execution_id);
  }
}

/// One run of a workflow, driven on its own task.
struct Run<N: ExecutionNotifier> {
  engine: WorkflowEngine<N>,
  workflow: Arc<Workflow>,
  execution_id: String,
  live: LiveExecution,
}

impl<N: ExecutionNotifier + 'static> Run<N> {
  #[instrument(
    name = "workflow_run",
    skip(self),
    fields(execution_id = %self.execution_id, workflow_id = %self.workflow.workflow_id)
  )]
  async fn execute(self) -> ExecutionState {
    info!("workflow_started");
    self.emit(ExecutionEvent::WorkflowStarted {
      execution_id: self.execution_id.clone(),
      workflow_id: self.workflow.workflow_id.clone(),
    });

    let layers = match self.workflow.layers() {
      Ok(layers) => layers,
      Err(e) => {
        let error = ExecutionError::Scheduling(e);
        return self.finish(ExecutionStatus::Failed, Some(error.to_string()));
      }
    };

    let total = layers.len();
    for (index, layer) in layers.into_iter().enumerate() {
      if self.live.cancel.is_cancelled() {
        return self.finish(
          ExecutionStatus::Cancelled,
          Some(ExecutionError::Cancelled.to_string()),
        );
      }
      self.run_layer(index, total, layer).await;
    }

    if self.live.cancel.is_cancelled() {
      return self.finish(
        ExecutionStatus::Cancelled,
        Some(ExecutionError::Cancelled.to_string()),
      );
    }

    self.finish(ExecutionStatus::Completed, None)
  }

  /// Spawn every node of the layer and wait for all of them to settle.
  async fn run_layer(&self, index: usize, total: usize, layer: Vec<String>) {
    let progress = (index + 1) as f64 / total as f64 * 100.0;

    let results = self.update(|state| {
      state.current_nodes = layer.clone();
      state.progress = progress;
      for node_id in &layer {
        if let Some(node) = state.nodes.get_mut(node_id) {
          node.status = NodeStatus::Running;
        }
      }
      state.results.clone()
    });

    info!(layer = index, nodes = ?layer, progress, "layer_started");
    self.emit(ExecutionEvent::LayerStarted {
      execution_id: self.execution_id.clone(),
      index,
      node_ids: layer.clone(),
      progress,
    });

    let mut handles = Vec::with_capacity(layer.len());
    for node_id in &layer {
      let Some(node) = self.workflow.get_node(node_id).cloned() else {
        self.record(
          node_id,
          Err(ExecutionError::NodeNotFound(node_id.clone())),
          Duration::ZERO,
        );
        continue;
      };

      self.emit(ExecutionEvent::NodeStarted {
        execution_id: self.execution_id.clone(),
        node_id: node_id.clone(),
      });

      let inputs = resolve_inputs(&self.workflow, node_id, &results);
      let dispatcher = self.engine.dispatcher.clone();
      let execution_id = self.execution_id.clone();
      let cancel = self.live.cancel.clone();
      let span = info_span!("node", node_id = %node_id, kind = %node.kind);

      let handle = tokio::spawn(
        async move {
          let started = Instant::now();
          let result = dispatcher
            .dispatch(&node, inputs, &execution_id, &cancel)
            .await;
          (result, started.elapsed())
        }
        .instrument(span),
      );
      handles.push((node_id.clone(), handle));
    }

    let (node_ids, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
    let outcomes = join_all(handles).await;

    for (node_id, outcome) in node_ids.into_iter().zip(outcomes) {
      let (result, elapsed) = outcome.unwrap_or_else(|e| {
        let error = ExecutionError::TaskJoin {
          node_id: node_id.clone(),
          message: e.to_string(),
        };
        (Err(error), Duration::ZERO)
      });
      self.record(&node_id, result, elapsed);
    }
  }

  /// Fold one node's outcome into the run state.
  fn record(
    &self,
    node_id: &str,
    result: Result<NodeOutput, ExecutionError>,
    elapsed: Duration,
  ) {
    let duration_ms = elapsed.as_millis() as u64;

    match result {
      Ok(output) => {
        info!(node_id, duration_ms, cached = output.cached, "node_completed");
        self.update(|state| {
          state
            .results
            .insert(node_id.to_string(), output.value.clone());
          state.nodes.insert(
            node_id.to_string(),
            NodeState {
              status: NodeStatus::Completed,
              execution_time_ms: Some(duration_ms),
              cached: output.cached,
            },
          );
        });
        self.emit(ExecutionEvent::NodeCompleted {
          execution_id: self.execution_id.clone(),
          node_id: node_id.to_string(),
          data: output.value,
          cached: output.cached,
        });
      }
      Err(e) => {
        let message = e.to_string();
        warn!(node_id, duration_ms, error = %message, "node_failed");
        self.update(|state| {
          state.errors.insert(node_id.to_string(), message.clone());
          state.nodes.insert(
            node_id.to_string(),
            NodeState {
              status: NodeStatus::Failed,
              execution_time_ms: Some(duration_ms),
              cached: false,
            },
          );
        });
        self.emit(ExecutionEvent::NodeFailed {
          execution_id: self.execution_id.clone(),
          node_id: node_id.to_string(),
          error: message,
        });
      }
    }
  }

  /// Move the run to a terminal status, drop it from the live set and
  /// return the final state.
  fn finish(&self, status: ExecutionStatus, error: Option<String>) -> ExecutionState {
    let state = self.update(|state| {
      state.finish(status, error.clone());
      state.clone()
    });
    self.engine.forget(&self.execution_id);

    let execution_id = self.execution_id.clone();
    match status {
      ExecutionStatus::Completed => {
        info!(failed_nodes = state.errors.len(), "workflow_completed");
        self.emit(ExecutionEvent::WorkflowCompleted { execution_id });
      }
      ExecutionStatus::Cancelled => {
        info!("workflow_cancelled");
        self.emit(ExecutionEvent::WorkflowCancelled { execution_id });
      }
      ExecutionStatus::Failed | ExecutionStatus::Running => {
        let error = error.unwrap_or_default();
        error!(error = %error, "workflow_failed");
        self.emit(ExecutionEvent::WorkflowFailed {
          execution_id,
          error,
        });
      }
    }

    state
  }

  fn update<R>(&self, f: impl FnOnce(&mut ExecutionState) -> R) -> R {
    let mut state = self.live.state.write().unwrap_or_else(|e| e.into_inner());
    f(&mut state)
  }

  fn emit(&self, event: ExecutionEvent) {
    self.engine.notifier.notify(event);
  }
}
