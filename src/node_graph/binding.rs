use std::collections::BTreeMap;

use crate::models::schema::{BindingSlot, GraphNode, InputSpec, PipelineNode};

/// Slots reachable by the manual toggle. E and F are assigned directly.
const TOGGLE_CYCLE: [BindingSlot; 4] = [BindingSlot::A, BindingSlot::B, BindingSlot::C, BindingSlot::D];

/// Where an input's value comes from at shader run time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamRef {
    Literal(f32),
    Bound(BindingSlot),
}

pub fn resolve(node: &PipelineNode, spec: &InputSpec) -> ParamRef {
    match node.binding(&spec.id) {
        Some(slot) => ParamRef::Bound(slot),
        None => ParamRef::Literal(resolve_value(&node.params, spec)),
    }
}

/// Current numeric value for an input, falling back to the input default and
/// honouring its hard clamp.
pub fn resolve_value(params: &BTreeMap<String, f32>, spec: &InputSpec) -> f32 {
    let value = params
        .get(&spec.id)
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(spec.default_value);
    spec.apply_clamp(value)
}

/// unbound -> A -> B -> C -> D -> unbound. A directly assigned E or F goes
/// back to unbound.
pub fn next_binding(current: Option<BindingSlot>) -> Option<BindingSlot> {
    match current {
        None => Some(TOGGLE_CYCLE[0]),
        Some(slot) => TOGGLE_CYCLE
            .iter()
            .position(|s| *s == slot)
            .and_then(|idx| TOGGLE_CYCLE.get(idx + 1).copied()),
    }
}

pub fn toggle_binding(node: &GraphNode, input_id: &str) -> GraphNode {
    let mut next = node.clone();
    let slot = next_binding(node.binding(input_id));
    set_binding(&mut next.bindings, input_id, slot);
    next
}

pub fn set_binding(
    bindings: &mut BTreeMap<String, Option<BindingSlot>>,
    input_id: &str,
    slot: Option<BindingSlot>,
) {
    match slot {
        Some(slot) => {
            bindings.insert(input_id.to_string(), Some(slot));
        }
        None => {
            bindings.remove(input_id);
        }
    }
}

/// Bindings that actually point at a slot; explicit "no binding" entries are skipped.
pub fn defined_bindings(
    bindings: &BTreeMap<String, Option<BindingSlot>>,
) -> impl Iterator<Item = (&str, BindingSlot)> + '_ {
    bindings
        .iter()
        .filter_map(|(id, slot)| slot.map(|slot| (id.as_str(), slot)))
}

/// GLSL float literal; always carries a decimal point or exponent.
pub fn glsl_float(value: f32) -> String {
    if !value.is_finite() {
        return "0.0".to_string();
    }
    format!("{:?}", value)
}
