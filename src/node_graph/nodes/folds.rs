use super::*;

pub fn get_node_types() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition {
            id: "box_fold",
            name: "Box Fold",
            description: "Reflects the point back inside an axis-aligned box.",
            category: "Folds",
            arity: NodeArity::Single,
            inputs: vec![InputSpec::new("limit", "Limit", 0.0, 4.0, 0.01, 1.0).clamped(0.0, 16.0)],
            emit: emit_box_fold,
        },
        NodeDefinition {
            id: "sphere_fold",
            name: "Sphere Fold",
            description: "Inverts the point through a pair of spheres, scaling the derivative.",
            category: "Folds",
            arity: NodeArity::Single,
            inputs: vec![
                InputSpec::new("min_radius", "Min Radius", 0.0, 2.0, 0.01, 0.5).clamped(0.001, 8.0),
                InputSpec::new("fixed_radius", "Fixed Radius", 0.0, 4.0, 0.01, 1.0)
                    .clamped(0.001, 16.0),
            ],
            emit: emit_sphere_fold,
        },
        NodeDefinition {
            id: "abs_fold",
            name: "Abs Fold",
            description: "Mirrors every axis, then shifts by an offset.",
            category: "Folds",
            arity: NodeArity::Single,
            inputs: vec![
                InputSpec::new("offset_x", "Offset X", -2.0, 2.0, 0.01, 0.0),
                InputSpec::new("offset_y", "Offset Y", -2.0, 2.0, 0.01, 0.0),
                InputSpec::new("offset_z", "Offset Z", -2.0, 2.0, 0.01, 0.0),
            ],
            emit: emit_abs_fold,
        },
        NodeDefinition {
            id: "menger_fold",
            name: "Menger Fold",
            description: "Mirrors every axis and sorts components in descending order.",
            category: "Folds",
            arity: NodeArity::Single,
            inputs: Vec::new(),
            emit: emit_menger_fold,
        },
    ]
}

fn emit_box_fold(ctx: &EmitContext<'_>) -> String {
    let o = ctx.output;
    let limit = ctx.param("limit");
    format!("{o}.xyz = clamp({o}.xyz, -{limit}, {limit}) * 2.0 - {o}.xyz;\n")
}

fn emit_sphere_fold(ctx: &EmitContext<'_>) -> String {
    let o = ctx.output;
    let min_radius = ctx.param("min_radius");
    let fixed_radius = ctx.param("fixed_radius");
    format!(
        "{{\n\
         \x20   float r2 = dot({o}.xyz, {o}.xyz);\n\
         \x20   float mr2 = {min_radius} * {min_radius};\n\
         \x20   float fr2 = {fixed_radius} * {fixed_radius};\n\
         \x20   if (r2 < mr2) {{ {o} *= fr2 / mr2; }}\n\
         \x20   else if (r2 < fr2) {{ {o} *= fr2 / r2; }}\n\
         }}\n"
    )
}

fn emit_abs_fold(ctx: &EmitContext<'_>) -> String {
    let o = ctx.output;
    format!(
        "{o}.xyz = abs({o}.xyz) - vec3({}, {}, {});\n",
        ctx.param("offset_x"),
        ctx.param("offset_y"),
        ctx.param("offset_z")
    )
}

fn emit_menger_fold(ctx: &EmitContext<'_>) -> String {
    let o = ctx.output;
    format!(
        "{o}.xyz = abs({o}.xyz);\n\
         if ({o}.x < {o}.y) {o}.xy = {o}.yx;\n\
         if ({o}.x < {o}.z) {o}.xz = {o}.zx;\n\
         if ({o}.y < {o}.z) {o}.yz = {o}.zy;\n"
    )
}
