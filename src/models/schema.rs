use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// Id of the sentinel node feeding the per-pixel iteration input.
pub const ROOT_START: &str = "root-start";
/// Id of the sentinel node anchoring the final distance output.
pub const ROOT_END: &str = "root-end";

pub fn is_sentinel(id: &str) -> bool {
    id == ROOT_START || id == ROOT_END
}

#[derive(TS, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[ts(export, export_to = "schema.ts")]
pub enum BindingSlot {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl BindingSlot {
    pub const ALL: [BindingSlot; 6] = [
        BindingSlot::A,
        BindingSlot::B,
        BindingSlot::C,
        BindingSlot::D,
        BindingSlot::E,
        BindingSlot::F,
    ];

    pub fn letter(self) -> char {
        match self {
            BindingSlot::A => 'A',
            BindingSlot::B => 'B',
            BindingSlot::C => 'C',
            BindingSlot::D => 'D',
            BindingSlot::E => 'E',
            BindingSlot::F => 'F',
        }
    }

    /// Uniform name the renderer keeps populated, e.g. `uParamC`.
    pub fn uniform_name(self, prefix: &str) -> String {
        format!("{}{}", prefix, self.letter())
    }
}

/// Input slot on a dual-input (combiner) node.
#[derive(TS, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "schema.ts")]
pub enum InputHandle {
    A,
    B,
}

#[derive(TS, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[ts(export, export_to = "schema.ts")]
pub enum NodeArity {
    Single,
    Dual,
}

#[derive(TS, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[ts(export, export_to = "schema.ts")]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

#[derive(TS, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "schema.ts")]
#[ts(rename_all = "camelCase")]
pub struct InputSpec {
    pub id: String,
    pub label: String,
    pub range: ParamRange,
    pub step: f32,
    pub default_value: f32,
    /// Values outside this range are clamped on write and on emission.
    pub clamp: Option<ParamRange>,
}

impl InputSpec {
    pub fn new(id: &str, label: &str, min: f32, max: f32, step: f32, default_value: f32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            range: ParamRange { min, max },
            step,
            default_value,
            clamp: None,
        }
    }

    pub fn clamped(mut self, min: f32, max: f32) -> Self {
        self.clamp = Some(ParamRange { min, max });
        self
    }

    pub fn apply_clamp(&self, value: f32) -> f32 {
        match self.clamp {
            Some(range) => value.clamp(range.min, range.max),
            None => value,
        }
    }
}

/// Registry metadata for one node type, as shown by the editor palette.
#[derive(TS, Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "schema.ts")]
#[ts(rename_all = "camelCase")]
pub struct NodeTypeDef {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub arity: NodeArity,
    pub inputs: Vec<InputSpec>,
    /// True for the inert stand-in used when a type id is not registered.
    #[serde(default)]
    pub placeholder: bool,
}

#[derive(TS, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[ts(export, export_to = "schema.ts")]
pub struct NodeCondition {
    pub active: bool,
    pub modulus: u32,
    pub remainder: u32,
}

impl NodeCondition {
    pub fn is_valid(&self) -> bool {
        self.modulus >= 1 && self.remainder < self.modulus
    }
}

#[derive(TS, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[ts(export, export_to = "schema.ts")]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

#[derive(TS, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "schema.ts")]
#[ts(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub type_id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
    /// An explicit `None` entry means "no binding" and compares equal to absence.
    #[serde(default)]
    pub bindings: BTreeMap<String, Option<BindingSlot>>,
    #[serde(default)]
    pub condition: Option<NodeCondition>,
    /// UI-only; never part of ordering or equality.
    #[serde(default)]
    pub position: Option<NodePosition>,
}

fn default_enabled() -> bool {
    true
}

impl GraphNode {
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_id: type_id.into(),
            enabled: true,
            params: BTreeMap::new(),
            bindings: BTreeMap::new(),
            condition: None,
            position: None,
        }
    }

    pub fn binding(&self, input_id: &str) -> Option<BindingSlot> {
        self.bindings.get(input_id).copied().flatten()
    }
}

#[derive(TS, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "schema.ts")]
#[ts(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub target_handle: Option<InputHandle>,
}

#[derive(TS, Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "schema.ts")]
#[ts(rename_all = "camelCase")]
pub struct FractalGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

/// Upstream node ids feeding a pipeline node. `a` is omitted when it is the
/// previous pipeline node (or the iteration input for the first node).
#[derive(TS, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[ts(export, export_to = "schema.ts")]
pub struct NodeSources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
}

impl NodeSources {
    pub fn is_empty(&self) -> bool {
        self.a.is_none() && self.b.is_none()
    }
}

/// A graph node with its UI position stripped, in canonical execution order.
#[derive(TS, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "schema.ts")]
#[ts(rename_all = "camelCase")]
pub struct PipelineNode {
    pub id: String,
    pub type_id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
    #[serde(default)]
    pub bindings: BTreeMap<String, Option<BindingSlot>>,
    #[serde(default)]
    pub condition: Option<NodeCondition>,
    #[serde(default, skip_serializing_if = "NodeSources::is_empty")]
    pub sources: NodeSources,
}

impl PipelineNode {
    pub fn from_graph_node(node: &GraphNode, sources: NodeSources) -> Self {
        Self {
            id: node.id.clone(),
            type_id: node.type_id.clone(),
            enabled: node.enabled,
            params: node.params.clone(),
            bindings: node.bindings.clone(),
            condition: node.condition,
            sources,
        }
    }

    pub fn binding(&self, input_id: &str) -> Option<BindingSlot> {
        self.bindings.get(input_id).copied().flatten()
    }
}

pub type Pipeline = Vec<PipelineNode>;

/// One element of the param uniform array: which node input it carries.
#[derive(TS, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "schema.ts")]
#[ts(rename_all = "camelCase")]
pub struct ParamSlot {
    pub node_id: String,
    pub input_id: String,
}

/// Emitted formula body plus what the renderer needs to run it.
#[derive(TS, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "schema.ts")]
#[ts(rename_all = "camelCase")]
pub struct ShaderFragment {
    /// Statements spliced inside the renderer's iteration loop.
    pub source: String,
    /// Uniform declarations for the param array and binding slots.
    pub declarations: String,
    pub param_layout: Vec<ParamSlot>,
    pub param_values: Vec<f32>,
    /// SHA-256 of declarations + source, hex encoded.
    pub hash: String,
}
