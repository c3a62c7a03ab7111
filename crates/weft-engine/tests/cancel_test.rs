mod common;

use common::*;
use serde_json::json;
use weft_engine::{EngineConfig, ExecutionStatus, NodeStatus, WorkflowEngine};

#[tokio::test]
async fn test_abort_before_next_layer() {
  let gate = Gate::default();
  let counter = Counter::default();
  let mut registry = registry();
  registry.register(tag("gate"), gate.clone());
  registry.register(tag("count"), counter.clone());
  let engine = WorkflowEngine::new(EngineConfig::default(), registry);

  let wf = workflow(
    vec![node("first", "gate"), node("second", "count")],
    vec![link("first", "second")],
  );

  let execution = engine.execute(wf, no_inputs());
  let execution_id = execution.execution_id().to_string();
  gate.started.notified().await;

  let live = engine.snapshot(&execution_id).unwrap();
  assert_eq!(live.status, ExecutionStatus::Running);
  assert_eq!(live.current_nodes, vec!["first".to_string()]);
  assert_eq!(live.progress, 50.0);

  assert!(engine.abort(&execution_id));
  assert!(engine.abort(&execution_id));
  gate.release.notify_one();

  let state = execution.wait().await;

  assert_eq!(state.status, ExecutionStatus::Cancelled);
  assert_eq!(state.error.as_deref(), Some("execution cancelled"));
  assert_eq!(state.results["first"], json!("gated"));
  assert!(!state.results.contains_key("second"));
  assert_eq!(state.nodes["second"].status, NodeStatus::Idle);
  assert_eq!(counter.count(), 0);

  assert!(engine.snapshot(&execution_id).is_none());
  assert!(!engine.abort(&execution_id));
}

#[tokio::test]
async fn test_abort_interrupts_in_flight_node() {
  let blocker = UntilCancelled::default();
  let mut registry = registry();
  registry.register(tag("block"), blocker.clone());
  let engine = WorkflowEngine::new(EngineConfig::default(), registry);

  let wf = workflow(
    vec![node("slow", "block"), node("quick", "echo"), node("after", "echo")],
    vec![link("slow", "after")],
  );

  let execution = engine.execute(wf, no_inputs());
  blocker.started.notified().await;
  execution.abort();

  let state = execution.wait().await;

  assert_eq!(state.status, ExecutionStatus::Cancelled);
  assert_eq!(state.errors["slow"], "execution cancelled");
  assert_eq!(state.nodes["quick"].status, NodeStatus::Completed);
  assert_eq!(state.nodes["after"].status, NodeStatus::Idle);
}

#[tokio::test]
async fn test_abort_unknown_execution_is_noop() {
  let engine = WorkflowEngine::new(EngineConfig::default(), registry());
  assert!(!engine.abort("no-such-run"));
  assert!(engine.live_executions().is_empty());
}

#[tokio::test]
async fn test_runs_are_independent() {
  let gate = Gate::default();
  let mut registry = registry();
  registry.register(tag("gate"), gate.clone());
  let engine = WorkflowEngine::new(EngineConfig::default(), registry);

  let blocked = engine.execute(workflow(vec![node("g", "gate")], vec![]), no_inputs());
  gate.started.notified().await;

  let other = engine
    .run(workflow(vec![source("s", json!(1))], vec![]), no_inputs())
    .await;
  assert_eq!(other.status, ExecutionStatus::Completed);
  assert_ne!(other.execution_id, blocked.execution_id());
  assert_eq!(engine.live_executions(), vec![blocked.execution_id().to_string()]);

  gate.release.notify_one();
  assert_eq!(blocked.wait().await.status, ExecutionStatus::Completed);
}
