mod settings;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use weft_config::WorkflowDef;
use weft_engine::{ChannelNotifier, ExecutionEvent, ExecutionStatus, WorkflowEngine};
use weft_task::HandlerRegistry;
use weft_workflow::Workflow;

use crate::settings::Settings;

/// Weft - run layered AI content workflows
#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the settings file (default: ~/.weft/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a workflow or a single node
  Run {
    #[command(subcommand)]
    target: RunTarget,
  },
}

#[derive(Subcommand)]
enum RunTarget {
  /// Run an entire workflow. Stdin may carry a JSON object of initial
  /// results keyed by node id.
  Workflow {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Run a single node. Stdin may carry a JSON object of inputs keyed by
  /// port name.
  Node {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// The node ID to execute
    #[arg(long)]
    node: String,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .with_target(false)
    .init();

  let cli = Cli::parse();

  let config_path = match cli.config {
    Some(path) => path,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".weft")
      .join("config.json"),
  };

  match cli.command {
    Some(Commands::Run { target }) => {
      let settings = Settings::load(&config_path)?;
      let rt = tokio::runtime::Runtime::new()?;
      match target {
        RunTarget::Workflow { workflow_file } => {
          rt.block_on(run_workflow(workflow_file, settings))?;
        }
        RunTarget::Node {
          workflow_file,
          node,
        } => {
          rt.block_on(run_node(workflow_file, node, settings))?;
        }
      }
    }
    None => {
      println!("weft - use --help to see available commands");
    }
  }

  Ok(())
}

async fn load_workflow(workflow_file: &Path) -> Result<Workflow> {
  let content = tokio::fs::read_to_string(workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  let def: WorkflowDef = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))?;

  Workflow::lock(def).context("invalid workflow")
}

async fn run_workflow(workflow_file: PathBuf, settings: Settings) -> Result<()> {
  let workflow = load_workflow(&workflow_file).await?;
  eprintln!(
    "Loaded workflow: {} ({} nodes)",
    workflow.name,
    workflow.nodes().len()
  );

  let initial_inputs = read_object_from_stdin()?;

  let (notifier, mut events) = ChannelNotifier::channel();
  let registry = HandlerRegistry::with_builtin(settings.providers());
  let engine = WorkflowEngine::with_notifier(settings.engine_config(), registry, notifier);

  let printer = tokio::spawn(async move {
    while let Some(event) = events.recv().await {
      print_event(&event);
    }
  });

  let execution = engine.execute(workflow, initial_inputs);
  let execution_id = execution.execution_id().to_string();
  eprintln!("Execution started: {execution_id}");

  let interrupt = {
    let engine = engine.clone();
    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("Interrupted, cancelling {execution_id}");
        engine.abort(&execution_id);
      }
    })
  };

  let state = execution.wait().await;
  interrupt.abort();
  let _ = interrupt.await;
  drop(engine);
  let _ = printer.await;

  println!("{}", serde_json::to_string_pretty(&state)?);

  if state.status != ExecutionStatus::Completed {
    bail!(
      "workflow did not complete ({:?}): {}",
      state.status,
      state.error.unwrap_or_default()
    );
  }
  Ok(())
}

async fn run_node(workflow_file: PathBuf, node_id: String, settings: Settings) -> Result<()> {
  let workflow = load_workflow(&workflow_file).await?;
  let node = workflow
    .get_node(&node_id)
    .with_context(|| format!("node '{}' not found in workflow", node_id))?;
  eprintln!("Running node: {} (type: {})", node_id, node.kind);

  let inputs = read_object_from_stdin()?;

  let registry = HandlerRegistry::with_builtin(settings.providers());
  let engine = WorkflowEngine::new(settings.engine_config(), registry);

  let output = engine
    .execute_node(&workflow, &node_id, inputs, CancellationToken::new())
    .await
    .context("node execution failed")?;

  eprintln!("Node execution completed");
  println!("{}", serde_json::to_string_pretty(&output.value)?);

  Ok(())
}

fn print_event(event: &ExecutionEvent) {
  match event {
    ExecutionEvent::LayerStarted {
      index,
      node_ids,
      progress,
      ..
    } => eprintln!("[{progress:>5.1}%] layer {index}: {}", node_ids.join(", ")),
    ExecutionEvent::NodeCompleted {
      node_id, cached, ..
    } => {
      let suffix = if *cached { " (cached)" } else { "" };
      eprintln!("  ok    {node_id}{suffix}");
    }
    ExecutionEvent::NodeFailed { node_id, error, .. } => {
      eprintln!("  fail  {node_id}: {error}");
    }
    ExecutionEvent::WorkflowCancelled { .. } => eprintln!("Execution cancelled"),
    _ => {}
  }
}

/// Read a JSON object from stdin, or an empty one when stdin is a terminal
/// or empty.
fn read_object_from_stdin() -> Result<Map<String, Value>> {
  if io::stdin().is_terminal() {
    return Ok(Map::new());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read input from stdin")?;

  if input.trim().is_empty() {
    return Ok(Map::new());
  }

  let value: Value =
    serde_json::from_str(&input).context("failed to parse input JSON from stdin")?;
  match value {
    Value::Object(map) => Ok(map),
    other => bail!("stdin input must be a JSON object, got: {other}"),
  }
}
