use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::schema::{
    BindingSlot, FractalGraph, InputHandle, NodeCondition, NodePosition, NodeTypeDef, Pipeline,
    PipelineNode, ShaderFragment,
};
use crate::node_graph::diff::{is_exactly_equal, is_structurally_equal};
use crate::node_graph::emitter::{emit, param_values};
use crate::node_graph::errors::{CompileError, SessionError};
use crate::node_graph::linearize::{graph_from_pipeline, linearize};
use crate::node_graph::nodes::registry;
use crate::settings::{CompileMode, CompilerSettings};

/// A discrete mutation arriving from the editor surface.
#[derive(TS, Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export, export_to = "session.ts")]
pub enum GraphEdit {
    AddNode {
        id: Option<String>,
        type_id: String,
    },
    RemoveNode {
        node_id: String,
    },
    Connect {
        source: String,
        target: String,
        handle: Option<InputHandle>,
    },
    Disconnect {
        edge_id: String,
    },
    SetParam {
        node_id: String,
        input_id: String,
        value: f32,
    },
    ToggleBinding {
        node_id: String,
        input_id: String,
    },
    SetBinding {
        node_id: String,
        input_id: String,
        slot: Option<BindingSlot>,
    },
    SetCondition {
        node_id: String,
        condition: Option<NodeCondition>,
    },
    SetEnabled {
        node_id: String,
        enabled: bool,
    },
    MoveNode {
        node_id: String,
        position: NodePosition,
    },
}

#[derive(TS, Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "session.ts")]
#[ts(rename_all = "camelCase")]
pub struct EditOutcome {
    /// The settled pipeline differs structurally from the last compiled one.
    pub requires_recompile: bool,
    /// Auto mode only: the fragment to hand to the renderer.
    pub fragment: Option<ShaderFragment>,
    /// Value-only edits: fresh uniforms for the fragment already on the GPU.
    pub param_values: Option<Vec<f32>>,
    /// Id of the node or edge created by the edit.
    pub created_id: Option<String>,
    /// Auto mode only: why the settled pipeline could not be emitted. The edit
    /// itself is kept and the renderer keeps its previous fragment.
    pub compile_error: Option<String>,
}

struct CompiledState {
    pipeline: Pipeline,
    fragment: ShaderFragment,
}

/// One exclusive editing session over a graph. Every edit re-linearizes;
/// whether it also recompiles depends on the compile mode and the
/// structural differ.
pub struct GraphSession {
    graph: FractalGraph,
    settings: CompilerSettings,
    pipeline: Pipeline,
    compiled: Option<CompiledState>,
}

impl GraphSession {
    pub fn new(settings: CompilerSettings) -> Self {
        Self {
            graph: FractalGraph::new(),
            settings,
            pipeline: Vec::new(),
            compiled: None,
        }
    }

    pub fn from_graph(
        mut graph: FractalGraph,
        settings: CompilerSettings,
    ) -> Result<Self, CompileError> {
        graph.normalize();
        let pipeline = linearize(&graph.nodes, &graph.edges)?;
        Ok(Self {
            graph,
            settings,
            pipeline,
            compiled: None,
        })
    }

    /// Rebuilds a session from a saved pipeline.
    pub fn from_pipeline(
        pipeline: &[PipelineNode],
        settings: CompilerSettings,
    ) -> Result<Self, CompileError> {
        Self::from_graph(graph_from_pipeline(pipeline, registry()), settings)
    }

    pub fn graph(&self) -> &FractalGraph {
        &self.graph
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    pub fn set_compile_mode(&mut self, mode: CompileMode) {
        self.settings.compile_mode = mode;
    }

    /// Registry metadata for a node, or a placeholder for unknown types.
    pub fn node_type(&self, node_id: &str) -> Option<NodeTypeDef> {
        self.graph
            .node(node_id)
            .map(|node| registry().describe_or_placeholder(&node.type_id))
    }

    /// Inlined literals live in the shader text, so with `inline_literals` a
    /// param edit needs a recompile as well.
    pub fn requires_recompile(&self) -> bool {
        match &self.compiled {
            Some(compiled) if self.settings.inline_literals => {
                !is_exactly_equal(&compiled.pipeline, &self.pipeline)
            }
            Some(compiled) => !is_structurally_equal(&compiled.pipeline, &self.pipeline),
            None => true,
        }
    }

    /// A rejected edit returns `SessionError::Graph` and changes nothing. A
    /// failed Auto-mode compile is reported in `compile_error` instead.
    pub fn apply(&mut self, edit: GraphEdit) -> Result<EditOutcome, SessionError> {
        let created_id = self.apply_to_graph(edit)?;
        self.pipeline = linearize(&self.graph.nodes, &self.graph.edges)?;

        let mut outcome = EditOutcome {
            requires_recompile: self.requires_recompile(),
            created_id,
            ..Default::default()
        };
        if outcome.requires_recompile {
            if self.settings.compile_mode == CompileMode::Auto {
                match self.compile() {
                    Ok(fragment) => {
                        outcome.fragment = Some(fragment);
                        outcome.requires_recompile = false;
                    }
                    Err(e) => {
                        log::warn!("Auto compile skipped: {}", e);
                        outcome.compile_error = Some(e.to_string());
                    }
                }
            }
        } else {
            outcome.param_values = Some(self.current_param_values());
        }
        Ok(outcome)
    }

    fn apply_to_graph(&mut self, edit: GraphEdit) -> Result<Option<String>, SessionError> {
        let graph = &mut self.graph;
        let created = match edit {
            GraphEdit::AddNode { id: Some(id), type_id } => {
                graph.add_node_with_id(&id, &type_id)?;
                Some(id)
            }
            GraphEdit::AddNode { id: None, type_id } => Some(graph.add_node(&type_id)?),
            GraphEdit::RemoveNode { node_id } => {
                graph.remove_node(&node_id)?;
                None
            }
            GraphEdit::Connect {
                source,
                target,
                handle,
            } => Some(graph.connect(&source, &target, handle)?),
            GraphEdit::Disconnect { edge_id } => {
                graph.disconnect(&edge_id)?;
                None
            }
            GraphEdit::SetParam {
                node_id,
                input_id,
                value,
            } => {
                graph.set_param(&node_id, &input_id, value)?;
                None
            }
            GraphEdit::ToggleBinding { node_id, input_id } => {
                graph.toggle_binding(&node_id, &input_id)?;
                None
            }
            GraphEdit::SetBinding {
                node_id,
                input_id,
                slot,
            } => {
                graph.set_binding(&node_id, &input_id, slot)?;
                None
            }
            GraphEdit::SetCondition { node_id, condition } => {
                graph.set_condition(&node_id, condition)?;
                None
            }
            GraphEdit::SetEnabled { node_id, enabled } => {
                graph.set_enabled(&node_id, enabled)?;
                None
            }
            GraphEdit::MoveNode { node_id, position } => {
                graph.set_position(&node_id, position)?;
                None
            }
        };
        Ok(created)
    }

    /// Emits the current pipeline and records it as the compiled baseline.
    pub fn compile(&mut self) -> Result<ShaderFragment, CompileError> {
        let fragment = emit(&self.pipeline, registry(), &self.settings)?;
        self.compiled = Some(CompiledState {
            pipeline: self.pipeline.clone(),
            fragment: fragment.clone(),
        });
        Ok(fragment)
    }

    /// Manual-mode trigger: emits only when the structure changed since the
    /// last compile.
    pub fn compile_if_needed(&mut self) -> Result<Option<ShaderFragment>, CompileError> {
        if self.requires_recompile() {
            self.compile().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Values for the compiled fragment's param array taken from the live pipeline.
    pub fn current_param_values(&self) -> Vec<f32> {
        match &self.compiled {
            Some(compiled) => {
                param_values(&compiled.fragment.param_layout, &self.pipeline, registry())
            }
            None => Vec::new(),
        }
    }

    pub fn save_pipeline(&self) -> Result<String, String> {
        serde_json::to_string_pretty(&self.pipeline)
            .map_err(|e| format!("Failed to serialize pipeline: {}", e))
    }

    pub fn load_pipeline(json: &str, settings: CompilerSettings) -> Result<Self, String> {
        let pipeline: Pipeline =
            serde_json::from_str(json).map_err(|e| format!("Invalid pipeline: {}", e))?;
        Self::from_pipeline(&pipeline, settings).map_err(|e| e.to_string())
    }
}
