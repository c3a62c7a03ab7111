//! Workflow execution engine for weft.
//!
//! The engine runs a locked [`Workflow`](weft_workflow::Workflow) layer by
//! layer. Nodes of a layer run concurrently, each on its own task, and the
//! next layer starts only once all of them have settled.
//!
//! ```text
//!                    ┌────────────────────┐
//!  execute() ───────▶│  WorkflowEngine    │──── abort() / snapshot()
//!                    └─────────┬──────────┘
//!                              │ spawn
//!                              ▼
//!                    ┌────────────────────┐   events   ┌───────────────────┐
//!                    │  Run (per layer)   │───────────▶│ ExecutionNotifier │
//!                    └─────────┬──────────┘            └───────────────────┘
//!                              │ join_all
//!                              ▼
//!                    ┌────────────────────┐   hit/put  ┌───────────────────┐
//!                    │    Dispatcher      │◀──────────▶│   ResultCache     │
//!                    └─────────┬──────────┘            └───────────────────┘
//!                              │
//!                              ▼
//!                    ┌────────────────────┐
//!                    │  HandlerRegistry   │  (weft-task)
//!                    └────────────────────┘
//! ```
//!
//! Node failures never abort a run; they are collected in
//! [`ExecutionState::errors`] and downstream nodes see the failed node's
//! output as absent. Only scheduling errors fail a run outright, and
//! cancellation is honoured between layers and by handlers watching the
//! token.

mod cache;
mod config;
mod dispatcher;
mod engine;
mod error;
mod events;
mod execution;
mod input;
mod state;

pub use cache::{DEFAULT_CACHE_TTL, ResultCache};
pub use config::EngineConfig;
pub use dispatcher::{Dispatcher, NodeOutput};
pub use engine::WorkflowEngine;
pub use error::ExecutionError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use execution::WorkflowExecution;
pub use input::{missing_required, resolve_inputs};
pub use state::{ExecutionState, ExecutionStatus, NodeState, NodeStatus};
