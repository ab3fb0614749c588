use crate::models::schema::{
    is_sentinel, BindingSlot, Edge, FractalGraph, GraphNode, InputHandle, NodeArity,
    NodeCondition, NodePosition, ROOT_END, ROOT_START,
};
use crate::node_graph::binding;
use crate::node_graph::cycle::would_create_cycle;
use crate::node_graph::errors::GraphError;
use crate::node_graph::nodes::{registry, NodeRegistry};

impl Default for FractalGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FractalGraph {
    /// Empty graph holding only the two sentinel nodes.
    pub fn new() -> Self {
        Self {
            nodes: vec![
                GraphNode::new(ROOT_START, ROOT_START),
                GraphNode::new(ROOT_END, ROOT_END),
            ],
            edges: Vec::new(),
        }
    }

    /// Restores missing sentinels and drops edges with a missing endpoint.
    /// Used after deserializing a graph from outside.
    pub fn normalize(&mut self) {
        for sentinel in [ROOT_START, ROOT_END] {
            if self.node(sentinel).is_none() {
                self.nodes.push(GraphNode::new(sentinel, sentinel));
            }
        }
        let before = self.edges.len();
        let nodes = &self.nodes;
        self.edges.retain(|edge| {
            nodes.iter().any(|n| n.id == edge.source) && nodes.iter().any(|n| n.id == edge.target)
        });
        if self.edges.len() != before {
            log::warn!(
                "Dropped {} dangling edges while loading graph",
                before - self.edges.len()
            );
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Non-sentinel nodes.
    pub fn real_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|node| !is_sentinel(&node.id))
    }

    pub fn incoming(&self, node_id: &str) -> impl Iterator<Item = &Edge> + '_ {
        let node_id = node_id.to_string();
        self.edges.iter().filter(move |edge| edge.target == node_id)
    }

    /// Adds a node of `type_id` under a fresh id, seeded with the type's defaults.
    pub fn add_node(&mut self, type_id: &str) -> Result<String, GraphError> {
        let id = format!("node-{}", uuid::Uuid::new_v4());
        self.add_node_with_id(&id, type_id)?;
        Ok(id)
    }

    /// Unknown types are accepted; they preview as placeholders and fail at emission.
    pub fn add_node_with_id(&mut self, id: &str, type_id: &str) -> Result<(), GraphError> {
        if is_sentinel(id) {
            return Err(GraphError::SentinelLocked(id.to_string()));
        }
        if self.node(id).is_some() {
            return Err(GraphError::DuplicateNode(id.to_string()));
        }
        let mut node = GraphNode::new(id, type_id);
        match registry().get(type_id) {
            Some(definition) => {
                for spec in &definition.inputs {
                    node.params.insert(spec.id.clone(), spec.default_value);
                }
            }
            None => log::warn!("Adding node '{}' with unknown type '{}'", id, type_id),
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<GraphNode, GraphError> {
        if is_sentinel(id) {
            return Err(GraphError::SentinelLocked(id.to_string()));
        }
        let idx = self
            .nodes
            .iter()
            .position(|node| node.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
        self.edges
            .retain(|edge| edge.source != id && edge.target != id);
        Ok(self.nodes.remove(idx))
    }

    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        handle: Option<InputHandle>,
    ) -> Result<String, GraphError> {
        self.connect_with(registry(), source, target, handle)
    }

    /// Validates and commits a new edge. Dual-input targets take a handle;
    /// without one the first free handle is used. Every other target accepts a
    /// single inbound edge.
    pub fn connect_with(
        &mut self,
        registry: &NodeRegistry,
        source: &str,
        target: &str,
        handle: Option<InputHandle>,
    ) -> Result<String, GraphError> {
        if self.node(source).is_none() {
            return Err(GraphError::UnknownNode(source.to_string()));
        }
        let Some(target_node) = self.node(target) else {
            return Err(GraphError::UnknownNode(target.to_string()));
        };
        if source == ROOT_END || target == ROOT_START {
            return Err(GraphError::InvalidSentinelEdge {
                source: source.to_string(),
                target: target.to_string(),
            });
        }
        if source == target {
            return Err(GraphError::SelfLoop(source.to_string()));
        }
        if self
            .edges
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
        {
            return Err(GraphError::DuplicateEdge {
                source: source.to_string(),
                target: target.to_string(),
            });
        }

        let target_handle = if target == ROOT_END {
            None
        } else {
            match registry.arity(&target_node.type_id) {
                NodeArity::Dual => Some(self.free_handle(target, handle)?),
                NodeArity::Single => {
                    if self.incoming(target).next().is_some() {
                        return Err(GraphError::InputOccupied {
                            node_id: target.to_string(),
                        });
                    }
                    None
                }
            }
        };

        let candidate = Edge {
            id: format!("edge-{}", uuid::Uuid::new_v4()),
            source: source.to_string(),
            target: target.to_string(),
            target_handle,
        };
        if would_create_cycle(&self.nodes, &self.edges, &candidate) {
            log::warn!("Rejected edge {} -> {}: would create a cycle", source, target);
            return Err(GraphError::WouldCreateCycle {
                source: source.to_string(),
                target: target.to_string(),
            });
        }

        let id = candidate.id.clone();
        self.edges.push(candidate);
        Ok(id)
    }

    fn free_handle(
        &self,
        target: &str,
        requested: Option<InputHandle>,
    ) -> Result<InputHandle, GraphError> {
        let taken = |handle: InputHandle| {
            self.incoming(target)
                .any(|edge| edge.target_handle.unwrap_or(InputHandle::A) == handle)
        };
        let candidates = match requested {
            Some(handle) => vec![handle],
            None => vec![InputHandle::A, InputHandle::B],
        };
        candidates
            .into_iter()
            .find(|handle| !taken(*handle))
            .ok_or_else(|| GraphError::InputOccupied {
                node_id: target.to_string(),
            })
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<Edge, GraphError> {
        let idx = self
            .edges
            .iter()
            .position(|edge| edge.id == edge_id)
            .ok_or_else(|| GraphError::UnknownEdge(edge_id.to_string()))?;
        Ok(self.edges.remove(idx))
    }

    pub fn set_param(&mut self, node_id: &str, input_id: &str, value: f32) -> Result<f32, GraphError> {
        if !value.is_finite() {
            return Err(GraphError::NotFinite {
                node_id: node_id.to_string(),
                input_id: input_id.to_string(),
            });
        }
        let node = self.node_mut(node_id)?;
        let value = match registry().get(&node.type_id) {
            Some(definition) => {
                let spec = definition.input(input_id).ok_or_else(|| GraphError::UnknownInput {
                    node_id: node_id.to_string(),
                    input_id: input_id.to_string(),
                })?;
                spec.apply_clamp(value)
            }
            None => value,
        };
        node.params.insert(input_id.to_string(), value);
        Ok(value)
    }

    /// Advances the input's binding one step through unbound, A, B, C, D.
    pub fn toggle_binding(
        &mut self,
        node_id: &str,
        input_id: &str,
    ) -> Result<Option<BindingSlot>, GraphError> {
        let node = self.node_mut(node_id)?;
        *node = binding::toggle_binding(node, input_id);
        Ok(node.binding(input_id))
    }

    /// Assigns any of the six slots directly, or clears the binding.
    pub fn set_binding(
        &mut self,
        node_id: &str,
        input_id: &str,
        slot: Option<BindingSlot>,
    ) -> Result<(), GraphError> {
        let node = self.node_mut(node_id)?;
        binding::set_binding(&mut node.bindings, input_id, slot);
        Ok(())
    }

    pub fn set_condition(
        &mut self,
        node_id: &str,
        condition: Option<NodeCondition>,
    ) -> Result<(), GraphError> {
        if let Some(c) = condition {
            if !c.is_valid() {
                return Err(GraphError::InvalidCondition {
                    modulus: c.modulus,
                    remainder: c.remainder,
                });
            }
        }
        self.node_mut(node_id)?.condition = condition;
        Ok(())
    }

    pub fn set_enabled(&mut self, node_id: &str, enabled: bool) -> Result<(), GraphError> {
        self.node_mut(node_id)?.enabled = enabled;
        Ok(())
    }

    /// Sentinels may be moved; position never affects compilation.
    pub fn set_position(&mut self, node_id: &str, position: NodePosition) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.to_string()))?;
        node.position = Some(position);
        Ok(())
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut GraphNode, GraphError> {
        if is_sentinel(id) {
            return Err(GraphError::SentinelLocked(id.to_string()));
        }
        self.nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }
}
