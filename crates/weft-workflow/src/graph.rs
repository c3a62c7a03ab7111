use std::collections::HashMap;

use weft_config::EdgeDef;

use crate::Node;

/// Graph structure for traversal and analysis.
///
/// Parallel edges between the same pair of nodes are kept, so in-degree counts
/// edges rather than distinct upstream nodes.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Node ids in declaration order.
  node_ids: Vec<String>,
  /// Adjacency list: node_id -> downstream node_ids, one entry per edge.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: node_id -> upstream node_ids, one entry per edge.
  reverse_adjacency: HashMap<String, Vec<String>>,
  /// Incoming edges per target node, in declaration order.
  input_edges: HashMap<String, Vec<EdgeDef>>,
}

impl Graph {
  /// Build a graph from nodes and edges.
  pub fn new(nodes: &[Node], edges: &[EdgeDef]) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut input_edges: HashMap<String, Vec<EdgeDef>> = HashMap::new();

    for node in nodes {
      adjacency.entry(node.id.clone()).or_default();
      reverse_adjacency.entry(node.id.clone()).or_default();
      input_edges.entry(node.id.clone()).or_default();
    }

    for edge in edges {
      adjacency
        .entry(edge.source.clone())
        .or_default()
        .push(edge.target.clone());
      reverse_adjacency
        .entry(edge.target.clone())
        .or_default()
        .push(edge.source.clone());
      input_edges
        .entry(edge.target.clone())
        .or_default()
        .push(edge.clone());
    }

    Self {
      node_ids: nodes.iter().map(|n| n.id.clone()).collect(),
      adjacency,
      reverse_adjacency,
      input_edges,
    }
  }

  /// All node ids in declaration order.
  pub fn node_ids(&self) -> &[String] {
    &self.node_ids
  }

  /// Incoming edges of a node.
  pub fn input_edges(&self, node_id: &str) -> &[EdgeDef] {
    self
      .input_edges
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get downstream nodes for a given node.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get upstream nodes for a given node.
  pub fn upstream(&self, node_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Number of incoming edges.
  pub fn in_degree(&self, node_id: &str) -> usize {
    self.upstream(node_id).len()
  }

  /// Nodes with no incoming edges, in declaration order.
  pub fn entry_points(&self) -> Vec<&str> {
    self
      .node_ids
      .iter()
      .filter(|id| self.in_degree(id) == 0)
      .map(|id| id.as_str())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use weft_config::NodeKind;

  fn node(id: &str) -> Node {
    Node {
      id: id.to_string(),
      kind: NodeKind::Viewer,
      config: serde_json::json!({}),
      inputs: vec![],
      outputs: vec![],
      cache_key: None,
    }
  }

  fn edge(id: &str, from: &str, to: &str) -> EdgeDef {
    EdgeDef::new(id, from, "out", to, "in")
  }

  #[test]
  fn test_degrees_and_neighbors() {
    let nodes = vec![node("a"), node("b"), node("c")];
    let edges = vec![edge("e1", "a", "b"), edge("e2", "a", "c"), edge("e3", "b", "c")];
    let graph = Graph::new(&nodes, &edges);

    assert_eq!(graph.in_degree("a"), 0);
    assert_eq!(graph.in_degree("c"), 2);
    assert_eq!(graph.downstream("a"), ["b".to_string(), "c".to_string()]);
    assert_eq!(graph.entry_points(), vec!["a"]);

    let incoming: Vec<&str> = graph.input_edges("c").iter().map(|e| e.id.as_str()).collect();
    assert_eq!(incoming, vec!["e2", "e3"]);
  }

  #[test]
  fn test_parallel_edges_count_separately() {
    let nodes = vec![node("a"), node("b")];
    let edges = vec![edge("e1", "a", "b"), edge("e2", "a", "b")];
    let graph = Graph::new(&nodes, &edges);

    assert_eq!(graph.in_degree("b"), 2);
    assert_eq!(graph.downstream("a").len(), 2);
  }

  #[test]
  fn test_unknown_node_has_no_neighbors() {
    let graph = Graph::new(&[node("a")], &[]);
    assert!(graph.downstream("missing").is_empty());
    assert!(graph.input_edges("missing").is_empty());
    assert_eq!(graph.in_degree("missing"), 0);
  }
}
