//! Test handlers and workflow builders.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use weft_config::{EdgeDef, NodeDef, NodeKind, PortDef, ValueKind, WorkflowDef};
use weft_task::{
  EnhancedPrompt, GenerationError, HandlerRegistry, ImageGenerator, NodeHandler, PromptEnhancer,
  Providers, TaskContext, TaskError, TextGenerator,
};
use weft_workflow::Workflow;

/// Returns the `in` input, or `config.value` when there is none.
pub struct Echo;

#[async_trait]
impl NodeHandler for Echo {
  async fn execute(
    &self,
    ctx: &TaskContext,
    _cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    Ok(
      ctx
        .input("in")
        .or_else(|| ctx.config.get("value"))
        .cloned()
        .unwrap_or(Value::Null),
    )
  }
}

pub struct Fail;

#[async_trait]
impl NodeHandler for Fail {
  async fn execute(
    &self,
    _ctx: &TaskContext,
    _cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    Err(TaskError::invalid_config("value", "always fails"))
  }
}

pub struct Panic;

#[async_trait]
impl NodeHandler for Panic {
  async fn execute(
    &self,
    _ctx: &TaskContext,
    _cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    panic!("handler blew up");
  }
}

/// Counts invocations and returns the count.
#[derive(Clone, Default)]
pub struct Counter(pub Arc<AtomicUsize>);

impl Counter {
  pub fn count(&self) -> usize {
    self.0.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl NodeHandler for Counter {
  async fn execute(
    &self,
    _ctx: &TaskContext,
    _cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(json!(n))
  }
}

/// Signals `started`, then waits for `release` without watching the token.
#[derive(Clone, Default)]
pub struct Gate {
  pub started: Arc<Notify>,
  pub release: Arc<Notify>,
}

#[async_trait]
impl NodeHandler for Gate {
  async fn execute(
    &self,
    _ctx: &TaskContext,
    _cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    self.started.notify_one();
    self.release.notified().await;
    Ok(json!("gated"))
  }
}

/// Signals `started`, then blocks until the run is cancelled.
#[derive(Clone, Default)]
pub struct UntilCancelled {
  pub started: Arc<Notify>,
}

#[async_trait]
impl NodeHandler for UntilCancelled {
  async fn execute(
    &self,
    _ctx: &TaskContext,
    cancel: &CancellationToken,
  ) -> Result<Value, TaskError> {
    self.started.notify_one();
    cancel.cancelled().await;
    Err(TaskError::Cancelled)
  }
}

/// Text provider that echoes the prompt.
pub struct EchoProvider;

#[async_trait]
impl TextGenerator for EchoProvider {
  async fn generate_text(
    &self,
    prompt: &str,
    _model: Option<&str>,
  ) -> Result<String, GenerationError> {
    Ok(prompt.to_string())
  }
}

#[async_trait]
impl PromptEnhancer for EchoProvider {
  async fn enhance_prompt(&self, prompt: &str) -> Result<EnhancedPrompt, GenerationError> {
    Ok(EnhancedPrompt {
      original_prompt: prompt.to_string(),
      final_prompt: prompt.to_string(),
    })
  }
}

#[async_trait]
impl ImageGenerator for EchoProvider {
  async fn generate_image(
    &self,
    prompt: &str,
    _aspect_ratio: &str,
    _model: Option<&str>,
  ) -> Result<Vec<String>, GenerationError> {
    Ok(vec![format!("image://{prompt}")])
  }
}

/// Built-in handlers backed by [`EchoProvider`], plus the test handlers
/// above under their own tags.
pub fn registry() -> HandlerRegistry {
  let mut registry = HandlerRegistry::with_builtin(Providers::from_single(Arc::new(EchoProvider)));
  registry.register(tag("echo"), Echo);
  registry.register(tag("fail"), Fail);
  registry.register(tag("panic"), Panic);
  registry
}

pub fn tag(name: &str) -> NodeKind {
  NodeKind::Custom(name.to_string())
}

/// A custom node with one optional `in` port and one `out` port.
pub fn node(id: &str, kind: &str) -> NodeDef {
  NodeDef::new(id, tag(kind), json!({}))
    .with_inputs(vec![PortDef::optional("in", ValueKind::Any)])
    .with_outputs(vec![PortDef::optional("out", ValueKind::Any)])
}

/// An `echo` node with no inputs that emits `value`.
pub fn source(id: &str, value: Value) -> NodeDef {
  NodeDef::new(id, tag("echo"), json!({ "value": value }))
    .with_inputs(vec![])
    .with_outputs(vec![PortDef::optional("out", ValueKind::Any)])
}

/// Like [`node`] but the `in` port is required.
pub fn strict_node(id: &str, kind: &str) -> NodeDef {
  node(id, kind).with_inputs(vec![PortDef::required("in", ValueKind::Any)])
}

/// Edge from `from.out` to `to.in`.
pub fn link(from: &str, to: &str) -> EdgeDef {
  EdgeDef::new(format!("{from}->{to}"), from, "out", to, "in")
}

pub fn workflow(nodes: Vec<NodeDef>, edges: Vec<EdgeDef>) -> Workflow {
  Workflow::lock(WorkflowDef {
    id: "wf-test".to_string(),
    name: "test".to_string(),
    nodes,
    edges,
  })
  .unwrap()
}

pub fn no_inputs() -> Map<String, Value> {
  Map::new()
}
