use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::models::schema::{InputSpec, NodeArity, NodeTypeDef};
use crate::node_graph::EmitContext;

mod combiners;
mod folds;
mod fractals;
mod transforms;

/// Renders one node's shader statements. The emitter has already declared
/// `ctx.output` initialised from input A; the fragment only mutates it.
pub type EmitFn = fn(&EmitContext<'_>) -> String;

pub struct NodeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// UI grouping only.
    pub category: &'static str,
    pub arity: NodeArity,
    pub inputs: Vec<InputSpec>,
    pub emit: EmitFn,
}

impl NodeDefinition {
    pub fn input(&self, input_id: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|spec| spec.id == input_id)
    }

    pub fn describe(&self) -> NodeTypeDef {
        NodeTypeDef {
            id: self.id.into(),
            name: self.name.into(),
            description: Some(self.description.into()),
            category: self.category.into(),
            arity: self.arity,
            inputs: self.inputs.clone(),
            placeholder: false,
        }
    }
}

/// Read-only catalog of node types keyed by type id.
pub struct NodeRegistry {
    definitions: BTreeMap<&'static str, NodeDefinition>,
}

impl NodeRegistry {
    pub fn builtin() -> Self {
        let mut types = Vec::new();
        types.extend(folds::get_node_types());
        types.extend(transforms::get_node_types());
        types.extend(fractals::get_node_types());
        types.extend(combiners::get_node_types());
        Self::from_definitions(types)
    }

    /// Later definitions replace earlier ones with the same id.
    pub fn from_definitions(definitions: Vec<NodeDefinition>) -> Self {
        Self {
            definitions: definitions.into_iter().map(|def| (def.id, def)).collect(),
        }
    }

    pub fn get(&self, type_id: &str) -> Option<&NodeDefinition> {
        self.definitions.get(type_id)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.definitions.contains_key(type_id)
    }

    pub fn arity(&self, type_id: &str) -> NodeArity {
        self.get(type_id)
            .map(|def| def.arity)
            .unwrap_or(NodeArity::Single)
    }

    pub fn get_node_types(&self) -> Vec<NodeTypeDef> {
        self.definitions.values().map(NodeDefinition::describe).collect()
    }

    /// Preview lookup: unknown types come back as an inert placeholder so the
    /// rest of the graph stays editable.
    pub fn describe_or_placeholder(&self, type_id: &str) -> NodeTypeDef {
        match self.get(type_id) {
            Some(def) => def.describe(),
            None => {
                log::warn!("Rendering unknown node type '{}' as placeholder", type_id);
                NodeTypeDef {
                    id: type_id.into(),
                    name: format!("Unknown ({})", type_id),
                    description: None,
                    category: "Unknown".into(),
                    arity: NodeArity::Single,
                    inputs: Vec::new(),
                    placeholder: true,
                }
            }
        }
    }
}

static REGISTRY: Lazy<NodeRegistry> = Lazy::new(NodeRegistry::builtin);

/// Process-wide catalog of the built-in node types.
pub fn registry() -> &'static NodeRegistry {
    &REGISTRY
}

pub fn get_node_types() -> Vec<NodeTypeDef> {
    registry().get_node_types()
}
