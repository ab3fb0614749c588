use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;

use crate::models::schema::{Edge, GraphNode};

/// Returns true when adding `candidate` to `edges` would close a directed
/// cycle. Edges whose endpoints are not in `nodes` are ignored. Inputs are not
/// mutated.
pub fn would_create_cycle(nodes: &[GraphNode], edges: &[Edge], candidate: &Edge) -> bool {
    if candidate.source == candidate.target {
        return true;
    }

    let mut dependency_graph: DiGraph<&str, ()> =
        DiGraph::with_capacity(nodes.len(), edges.len() + 1);
    let mut node_indices = HashMap::with_capacity(nodes.len());

    for node in nodes {
        let idx = dependency_graph.add_node(node.id.as_str());
        node_indices.insert(node.id.as_str(), idx);
    }

    for edge in edges.iter().chain(std::iter::once(candidate)) {
        let Some(&from_idx) = node_indices.get(edge.source.as_str()) else {
            continue;
        };
        let Some(&to_idx) = node_indices.get(edge.target.as_str()) else {
            continue;
        };
        dependency_graph.add_edge(from_idx, to_idx, ());
    }

    is_cyclic_directed(&dependency_graph)
}
