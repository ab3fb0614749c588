use std::collections::HashMap;
use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::models::schema::{
    BindingSlot, NodeArity, ParamSlot, PipelineNode, ShaderFragment, ROOT_START,
};
use crate::node_graph::binding::{glsl_float, resolve, resolve_value, ParamRef};
use crate::node_graph::errors::CompileError;
use crate::node_graph::nodes::NodeRegistry;
use crate::node_graph::EmitContext;
use crate::settings::CompilerSettings;

/// GLSL type of the iteration state: xyz is the point, w the running derivative.
pub const STATE_TYPE: &str = "vec4";

const INDENT: &str = "    ";

/// Renders the pipeline in order. Fails without producing any text when a
/// node type is not registered.
pub fn emit(
    pipeline: &[PipelineNode],
    registry: &NodeRegistry,
    settings: &CompilerSettings,
) -> Result<ShaderFragment, CompileError> {
    let state_var = settings.state_var.as_str();
    let mut outputs: HashMap<&str, String> = HashMap::with_capacity(pipeline.len());
    let mut running = state_var.to_string();
    let mut param_layout = Vec::new();
    let mut param_values = Vec::new();
    let mut body = String::new();

    for (index, node) in pipeline.iter().enumerate() {
        let definition = registry
            .get(&node.type_id)
            .ok_or_else(|| CompileError::UnknownNodeType {
                node_id: node.id.clone(),
                type_id: node.type_id.clone(),
            })?;

        let input_a = source_var(node, node.sources.a.as_deref(), &outputs, &running, state_var);
        if !node.enabled {
            // Pass-through: downstream readers see this node's input.
            outputs.insert(node.id.as_str(), input_a.clone());
            running = input_a;
            continue;
        }
        let input_b = match definition.arity {
            NodeArity::Dual => node
                .sources
                .b
                .as_deref()
                .map(|id| source_var(node, Some(id), &outputs, &running, state_var)),
            NodeArity::Single => None,
        };

        let mut params = HashMap::with_capacity(definition.inputs.len());
        for spec in &definition.inputs {
            let reference = match resolve(node, spec) {
                ParamRef::Bound(slot) => slot.uniform_name(&settings.slot_uniform_prefix),
                ParamRef::Literal(value) if settings.inline_literals => glsl_float(value),
                ParamRef::Literal(value) => {
                    let element = format!("{}[{}]", settings.param_array, param_layout.len());
                    param_layout.push(ParamSlot {
                        node_id: node.id.clone(),
                        input_id: spec.id.clone(),
                    });
                    param_values.push(value);
                    element
                }
            };
            params.insert(spec.id.clone(), reference);
        }

        let output = format!("v{}", index);
        let ctx = EmitContext {
            node_id: &node.id,
            output: &output,
            input_a: &input_a,
            input_b: input_b.as_deref(),
            params: &params,
        };
        let fragment = (definition.emit)(&ctx);

        let _ = writeln!(body, "// {} ({})", comment_safe(&node.id), node.type_id);
        let _ = writeln!(body, "{} {} = {};", STATE_TYPE, output, input_a);
        match node.condition.filter(|c| c.active) {
            Some(condition) if condition.is_valid() => {
                let _ = writeln!(
                    body,
                    "if (({} % {}) == {}) {{",
                    settings.iteration_var, condition.modulus, condition.remainder
                );
                for line in fragment.lines() {
                    let _ = writeln!(body, "{}{}", INDENT, line);
                }
                body.push_str("}\n");
            }
            Some(condition) => {
                log::warn!(
                    "Node '{}' has invalid condition {}/{}; emitting unguarded",
                    node.id,
                    condition.remainder,
                    condition.modulus
                );
                body.push_str(&fragment);
            }
            None => body.push_str(&fragment),
        }

        outputs.insert(node.id.as_str(), output.clone());
        running = output;
    }
    let _ = writeln!(body, "{} = {};", state_var, running);

    let declarations = declarations(settings, param_layout.len());
    let hash = fragment_hash(&declarations, &body);
    log::debug!(
        "Emitted {} nodes, {} param uniforms, hash {}",
        pipeline.len(),
        param_layout.len(),
        hash
    );

    Ok(ShaderFragment {
        source: body,
        declarations,
        param_layout,
        param_values,
        hash,
    })
}

/// Current values for a fragment's param array, in layout order. Used after
/// value-only edits so the renderer can upload uniforms without recompiling.
pub fn param_values(
    layout: &[ParamSlot],
    pipeline: &[PipelineNode],
    registry: &NodeRegistry,
) -> Vec<f32> {
    let nodes_by_id: HashMap<&str, &PipelineNode> =
        pipeline.iter().map(|node| (node.id.as_str(), node)).collect();

    layout
        .iter()
        .map(|slot| {
            let Some(node) = nodes_by_id.get(slot.node_id.as_str()) else {
                return 0.0;
            };
            registry
                .get(&node.type_id)
                .and_then(|def| def.input(&slot.input_id))
                .map(|spec| resolve_value(&node.params, spec))
                .unwrap_or(0.0)
        })
        .collect()
}

fn source_var(
    node: &PipelineNode,
    source: Option<&str>,
    outputs: &HashMap<&str, String>,
    running: &str,
    state_var: &str,
) -> String {
    match source {
        None => running.to_string(),
        Some(ROOT_START) => state_var.to_string(),
        Some(id) => match outputs.get(id) {
            Some(var) => var.clone(),
            None => {
                log::warn!(
                    "Node '{}' reads from '{}' which is not upstream; using previous output",
                    node.id,
                    id
                );
                running.to_string()
            }
        },
    }
}

fn declarations(settings: &CompilerSettings, param_count: usize) -> String {
    let mut out = String::new();
    if param_count > 0 {
        let _ = writeln!(out, "uniform float {}[{}];", settings.param_array, param_count);
    }
    for slot in BindingSlot::ALL {
        let _ = writeln!(
            out,
            "uniform float {};",
            slot.uniform_name(&settings.slot_uniform_prefix)
        );
    }
    out
}

fn fragment_hash(declarations: &str, source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(declarations.as_bytes());
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn comment_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
