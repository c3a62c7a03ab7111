//! Weft Workflow
//!
//! This crate provides the "locked" workflow representation for weft.
//! A locked workflow is a validated form of a [`weft_config::WorkflowDef`]
//! that is ready for execution.
//!
//! Key differences from `weft-config`:
//! - Node ids are unique and every node has resolved ports
//! - Every edge connects an existing output port to an existing input port
//! - The graph structure (adjacency, in-degree, input edges) is precomputed
//! - Nodes can be partitioned into dependency-ordered layers

mod error;
mod graph;
mod node;
mod schedule;
mod workflow;

pub use error::{PortDirection, WorkflowError};
pub use graph::Graph;
pub use node::Node;
pub use schedule::schedule_layers;
pub use weft_config::{EdgeDef as Edge, NodeKind, PortDef, ValueKind};
pub use workflow::Workflow;
