//! Topological layering.
//!
//! Layers are computed with Kahn's algorithm: the frontier of zero in-degree
//! nodes is emitted as one layer, the in-degree of every successor is
//! decremented, and successors reaching zero form the next frontier. Nodes in
//! the same layer have no dependencies on each other and may run concurrently.

use std::collections::{HashMap, HashSet};

use crate::error::WorkflowError;
use crate::graph::Graph;

/// Partition the graph into dependency-ordered layers.
///
/// Layer 0 holds exactly the nodes with no incoming edges. Within a layer, ids
/// follow node declaration order.
///
/// Nodes that never reach in-degree zero (members of a cycle and everything
/// downstream of one) make scheduling fail with
/// [`WorkflowError::CycleDetected`], naming them in sorted order.
pub fn schedule_layers(graph: &Graph) -> Result<Vec<Vec<String>>, WorkflowError> {
  let mut remaining: HashMap<&str, usize> = graph
    .node_ids()
    .iter()
    .map(|id| (id.as_str(), graph.in_degree(id)))
    .collect();

  let mut frontier: Vec<&str> = graph
    .node_ids()
    .iter()
    .map(|id| id.as_str())
    .filter(|id| remaining.get(id) == Some(&0))
    .collect();

  let mut layers: Vec<Vec<String>> = Vec::new();
  let mut scheduled: HashSet<&str> = HashSet::new();

  while !frontier.is_empty() {
    let mut ready: HashSet<&str> = HashSet::new();

    for id in &frontier {
      for next in graph.downstream(id) {
        if let Some(degree) = remaining.get_mut(next.as_str()) {
          *degree = degree.saturating_sub(1);
          if *degree == 0 {
            ready.insert(next.as_str());
          }
        }
      }
    }

    scheduled.extend(frontier.iter().copied());
    layers.push(frontier.iter().map(|id| id.to_string()).collect());

    frontier = graph
      .node_ids()
      .iter()
      .map(|id| id.as_str())
      .filter(|id| ready.contains(id))
      .collect();
  }

  if scheduled.len() < graph.node_ids().len() {
    let mut nodes: Vec<String> = graph
      .node_ids()
      .iter()
      .filter(|id| !scheduled.contains(id.as_str()))
      .cloned()
      .collect();
    nodes.sort();
    return Err(WorkflowError::CycleDetected { nodes });
  }

  Ok(layers)
}
