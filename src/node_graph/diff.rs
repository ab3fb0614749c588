use crate::models::schema::{NodeCondition, PipelineNode};
use crate::node_graph::binding::defined_bindings;

/// True when both pipelines compile to the same shader text: same order, ids,
/// types, enabled flags, defined bindings, wiring and active conditions.
/// Parameter values are ignored; changing them only needs a uniform upload.
pub fn is_structurally_equal(a: &[PipelineNode], b: &[PipelineNode]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|(left, right)| nodes_structurally_equal(left, right))
}

/// Full equality including parameter values, for undo history and diffing.
/// Never used to gate recompilation.
pub fn is_exactly_equal(a: &[PipelineNode], b: &[PipelineNode]) -> bool {
    a == b
}

fn nodes_structurally_equal(left: &PipelineNode, right: &PipelineNode) -> bool {
    left.id == right.id
        && left.type_id == right.type_id
        && left.enabled == right.enabled
        && left.sources == right.sources
        && defined_bindings(&left.bindings).eq(defined_bindings(&right.bindings))
        && conditions_equal(left.condition.as_ref(), right.condition.as_ref())
}

fn conditions_equal(left: Option<&NodeCondition>, right: Option<&NodeCondition>) -> bool {
    let left = left.filter(|c| c.active);
    let right = right.filter(|c| c.active);
    match (left, right) {
        (None, None) => true,
        (Some(l), Some(r)) => l.modulus == r.modulus && l.remainder == r.remainder,
        _ => false,
    }
}
