use super::*;

pub fn get_node_types() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition {
            id: "union",
            name: "Union",
            description: "Keeps whichever branch has the smaller distance estimate.",
            category: "Combiners",
            arity: NodeArity::Dual,
            inputs: Vec::new(),
            emit: emit_union,
        },
        NodeDefinition {
            id: "intersect",
            name: "Intersect",
            description: "Keeps whichever branch has the larger distance estimate.",
            category: "Combiners",
            arity: NodeArity::Dual,
            inputs: Vec::new(),
            emit: emit_intersect,
        },
        NodeDefinition {
            id: "blend",
            name: "Blend",
            description: "Linearly mixes the two branches.",
            category: "Combiners",
            arity: NodeArity::Dual,
            inputs: vec![InputSpec::new("mix", "Mix", 0.0, 1.0, 0.01, 0.5).clamped(0.0, 1.0)],
            emit: emit_blend,
        },
    ]
}

fn distance_estimate(var: &str) -> String {
    format!("length({var}.xyz) / max({var}.w, 1e-6)")
}

fn emit_union(ctx: &EmitContext<'_>) -> String {
    let (o, b) = (ctx.output, ctx.input_b());
    format!(
        "if ({} < {}) {o} = {b};\n",
        distance_estimate(b),
        distance_estimate(o)
    )
}

fn emit_intersect(ctx: &EmitContext<'_>) -> String {
    let (o, b) = (ctx.output, ctx.input_b());
    format!(
        "if ({} > {}) {o} = {b};\n",
        distance_estimate(b),
        distance_estimate(o)
    )
}

fn emit_blend(ctx: &EmitContext<'_>) -> String {
    format!(
        "{o} = mix({a}, {b}, {t});\n",
        o = ctx.output,
        a = ctx.input_a,
        b = ctx.input_b(),
        t = ctx.param("mix")
    )
}
