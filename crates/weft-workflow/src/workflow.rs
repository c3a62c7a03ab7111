use std::collections::{HashMap, HashSet};

use weft_config::WorkflowDef;

use crate::error::{PortDirection, WorkflowError};
use crate::graph::Graph;
use crate::node::Node;
use crate::schedule::schedule_layers;

/// A locked workflow ready for execution.
///
/// Locking checks that node ids are unique and that every edge connects an
/// existing output port to an existing input port. Acyclicity is checked when
/// layers are scheduled.
#[derive(Debug, Clone)]
pub struct Workflow {
  pub workflow_id: String,
  pub name: String,
  nodes: Vec<Node>,
  index: HashMap<String, usize>,
  graph: Graph,
}

impl Workflow {
  /// Validate a definition and lock it.
  pub fn lock(def: WorkflowDef) -> Result<Self, WorkflowError> {
    let nodes: Vec<Node> = def.nodes.into_iter().map(Node::from).collect();

    let mut index = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
      if index.insert(node.id.clone(), i).is_some() {
        return Err(WorkflowError::DuplicateNode(node.id.clone()));
      }
    }

    for edge in &def.edges {
      let source = index
        .get(&edge.source)
        .map(|i| &nodes[*i])
        .ok_or_else(|| WorkflowError::InvalidEdge {
          edge_id: edge.id.clone(),
          node_id: edge.source.clone(),
        })?;
      let target = index
        .get(&edge.target)
        .map(|i| &nodes[*i])
        .ok_or_else(|| WorkflowError::InvalidEdge {
          edge_id: edge.id.clone(),
          node_id: edge.target.clone(),
        })?;

      if source.output_port(&edge.source_handle).is_none() {
        return Err(WorkflowError::UnknownPort {
          edge_id: edge.id.clone(),
          node_id: source.id.clone(),
          port: edge.source_handle.clone(),
          direction: PortDirection::Output,
        });
      }
      if target.input_port(&edge.target_handle).is_none() {
        return Err(WorkflowError::UnknownPort {
          edge_id: edge.id.clone(),
          node_id: target.id.clone(),
          port: edge.target_handle.clone(),
          direction: PortDirection::Input,
        });
      }
    }

    let graph = Graph::new(&nodes, &def.edges);

    Ok(Self {
      workflow_id: def.id,
      name: def.name,
      nodes,
      index,
      graph,
    })
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&Node> {
    self.index.get(node_id).map(|i| &self.nodes[*i])
  }

  /// Nodes in declaration order.
  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  /// The graph structure for traversal.
  pub fn graph(&self) -> &Graph {
    &self.graph
  }

  /// Dependency-ordered layers, see [`schedule_layers`].
  pub fn layers(&self) -> Result<Vec<Vec<String>>, WorkflowError> {
    schedule_layers(&self.graph)
  }

  /// Ids of nodes that nothing is wired into.
  pub fn entry_points(&self) -> HashSet<&str> {
    self.graph.entry_points().into_iter().collect()
  }
}

impl TryFrom<WorkflowDef> for Workflow {
  type Error = WorkflowError;

  fn try_from(def: WorkflowDef) -> Result<Self, Self::Error> {
    Workflow::lock(def)
  }
}
