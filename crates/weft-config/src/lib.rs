//! Weft Config
//!
//! This crate contains the serializable workflow definition types for weft.
//! These types represent a workflow as it is authored (by the canvas editor or
//! by hand as JSON) before it is validated and locked by `weft-workflow`.
//!
//! A definition looks like:
//!
//! ```json
//! {
//!   "id": "wf-summary",
//!   "name": "Summarize",
//!   "nodes": [
//!     { "id": "in", "type": "text_input", "config": { "defaultValue": "hello" } },
//!     { "id": "llm", "type": "llm_processor", "config": { "userPrompt": "Summarize: {{context}}" } }
//!   ],
//!   "edges": [
//!     { "id": "e1", "source": "in", "sourceHandle": "text", "target": "llm", "targetHandle": "context" }
//!   ]
//! }
//! ```
//!
//! Nodes that declare no ports get the default port set of their kind, see
//! [`NodeKind::default_inputs`] and [`NodeKind::default_outputs`].

mod edge;
mod node;
mod port;
mod workflow;

pub use edge::EdgeDef;
pub use node::{NodeDef, NodeKind};
pub use port::{PortDef, ValueKind};
pub use workflow::WorkflowDef;
