use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::schema::{
    is_sentinel, Edge, FractalGraph, GraphNode, InputHandle, NodeArity, NodePosition,
    NodeSources, Pipeline, PipelineNode, ROOT_END, ROOT_START,
};
use crate::node_graph::errors::CompileError;
use crate::node_graph::nodes::NodeRegistry;

/// Vertical spacing used when rebuilding a graph from a saved pipeline.
const NODE_SPACING: f64 = 120.0;

/// Orders the non-sentinel nodes with Kahn's algorithm, always taking the
/// lexicographically smallest ready id, so the result depends only on ids and
/// edge topology. Edges touching a missing node are treated as removed.
pub fn linearize(nodes: &[GraphNode], edges: &[Edge]) -> Result<Pipeline, CompileError> {
    let nodes_by_id: BTreeMap<&str, &GraphNode> = nodes
        .iter()
        .filter(|node| !is_sentinel(&node.id))
        .map(|node| (node.id.as_str(), node))
        .collect();

    let mut in_degree: BTreeMap<&str, usize> = nodes_by_id.keys().map(|id| (*id, 0)).collect();
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut incoming_edges: HashMap<&str, Vec<&Edge>> = HashMap::new();

    for edge in edges {
        let target = edge.target.as_str();
        if !nodes_by_id.contains_key(target) {
            if !is_sentinel(target) {
                log::warn!("Ignoring edge '{}' to missing node '{}'", edge.id, target);
            }
            continue;
        }
        let source = edge.source.as_str();
        if source == ROOT_START {
            incoming_edges.entry(target).or_default().push(edge);
            continue;
        }
        if !nodes_by_id.contains_key(source) {
            log::warn!("Ignoring edge '{}' from missing node '{}'", edge.id, source);
            continue;
        }
        successors.entry(source).or_default().push(target);
        if let Some(degree) = in_degree.get_mut(target) {
            *degree += 1;
        }
        incoming_edges.entry(target).or_default().push(edge);
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order: Vec<&str> = Vec::with_capacity(nodes_by_id.len());

    while let Some(id) = ready.pop_first() {
        order.push(id);
        for target in successors.get(id).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(target) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*target);
                }
            }
        }
    }

    if order.len() < nodes_by_id.len() {
        let remaining: Vec<String> = in_degree
            .iter()
            .filter(|(_, degree)| **degree > 0)
            .map(|(id, _)| id.to_string())
            .collect();
        return Err(CompileError::CycleDetected { remaining });
    }

    let mut pipeline = Vec::with_capacity(order.len());
    for (index, id) in order.iter().enumerate() {
        let implicit_source = if index == 0 { ROOT_START } else { order[index - 1] };
        let sources = collect_sources(id, incoming_edges.get(id), implicit_source);
        pipeline.push(PipelineNode::from_graph_node(nodes_by_id[id], sources));
    }

    log::debug!(
        "Linearized {} nodes from {} edges",
        pipeline.len(),
        edges.len()
    );
    Ok(pipeline)
}

fn collect_sources(node_id: &str, edges: Option<&Vec<&Edge>>, implicit_source: &str) -> NodeSources {
    let mut edges: Vec<&Edge> = edges.cloned().unwrap_or_default();
    edges.sort_by(|a, b| {
        (a.target_handle, a.source.as_str()).cmp(&(b.target_handle, b.source.as_str()))
    });

    let mut primary: Option<&str> = None;
    let mut secondary: Option<&str> = None;
    for edge in edges {
        let slot = match edge.target_handle {
            Some(InputHandle::B) => &mut secondary,
            _ => &mut primary,
        };
        if slot.is_some() {
            log::warn!(
                "Node '{}' has more than one edge into the same input; ignoring '{}'",
                node_id,
                edge.id
            );
            continue;
        }
        *slot = Some(edge.source.as_str());
    }

    NodeSources {
        a: primary
            .filter(|source| *source != implicit_source)
            .map(String::from),
        b: secondary.map(String::from),
    }
}

/// Rebuilds an editable graph from a saved pipeline: every node is wired from
/// its recorded sources, or from the previous node when none is recorded, and
/// the last node feeds the output sentinel. Positions are synthetic.
pub fn graph_from_pipeline(pipeline: &[PipelineNode], registry: &NodeRegistry) -> FractalGraph {
    let mut graph = FractalGraph::new();
    let end_y = (pipeline.len() + 1) as f64 * NODE_SPACING;
    for sentinel in graph.nodes.iter_mut() {
        let y = if sentinel.id == ROOT_END { end_y } else { 0.0 };
        sentinel.position = Some(NodePosition { x: 0.0, y });
    }

    let mut previous = ROOT_START;
    for (index, entry) in pipeline.iter().enumerate() {
        graph.nodes.push(GraphNode {
            id: entry.id.clone(),
            type_id: entry.type_id.clone(),
            enabled: entry.enabled,
            params: entry.params.clone(),
            bindings: entry.bindings.clone(),
            condition: entry.condition,
            position: Some(NodePosition {
                x: 0.0,
                y: (index + 1) as f64 * NODE_SPACING,
            }),
        });

        let dual = registry.arity(&entry.type_id) == NodeArity::Dual || entry.sources.b.is_some();
        let primary = entry.sources.a.as_deref().unwrap_or(previous);
        let primary_handle = if dual { Some(InputHandle::A) } else { None };
        graph.edges.push(chain_edge(primary, &entry.id, primary_handle));
        if let Some(secondary) = entry.sources.b.as_deref() {
            graph
                .edges
                .push(chain_edge(secondary, &entry.id, Some(InputHandle::B)));
        }
        previous = entry.id.as_str();
    }
    graph.edges.push(chain_edge(previous, ROOT_END, None));

    graph
}

fn chain_edge(source: &str, target: &str, handle: Option<InputHandle>) -> Edge {
    let suffix = match handle {
        Some(InputHandle::B) => ":b",
        _ => "",
    };
    Edge {
        id: format!("{}->{}{}", source, target, suffix),
        source: source.to_string(),
        target: target.to_string(),
        target_handle: handle,
    }
}
