use super::*;

pub fn get_node_types() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition {
            id: "rotate",
            name: "Rotate",
            description: "Rotates the point about X, then Y, then Z (degrees).",
            category: "Transforms",
            arity: NodeArity::Single,
            inputs: vec![
                InputSpec::new("angle_x", "Angle X", -180.0, 180.0, 0.5, 0.0),
                InputSpec::new("angle_y", "Angle Y", -180.0, 180.0, 0.5, 0.0),
                InputSpec::new("angle_z", "Angle Z", -180.0, 180.0, 0.5, 0.0),
            ],
            emit: emit_rotate,
        },
        NodeDefinition {
            id: "scale",
            name: "Scale",
            description: "Uniformly scales the point and its running derivative.",
            category: "Transforms",
            arity: NodeArity::Single,
            inputs: vec![InputSpec::new("scale", "Scale", -4.0, 4.0, 0.01, 2.0)],
            emit: emit_scale,
        },
        NodeDefinition {
            id: "translate",
            name: "Translate",
            description: "Offsets the point.",
            category: "Transforms",
            arity: NodeArity::Single,
            inputs: vec![
                InputSpec::new("x", "X", -4.0, 4.0, 0.01, 0.0),
                InputSpec::new("y", "Y", -4.0, 4.0, 0.01, 0.0),
                InputSpec::new("z", "Z", -4.0, 4.0, 0.01, 0.0),
            ],
            emit: emit_translate,
        },
    ]
}

fn emit_rotate(ctx: &EmitContext<'_>) -> String {
    let o = ctx.output;
    format!(
        "{{\n\
         \x20   vec3 a = radians(vec3({}, {}, {}));\n\
         \x20   float c = cos(a.x); float s = sin(a.x);\n\
         \x20   {o}.yz = mat2(c, -s, s, c) * {o}.yz;\n\
         \x20   c = cos(a.y); s = sin(a.y);\n\
         \x20   {o}.xz = mat2(c, -s, s, c) * {o}.xz;\n\
         \x20   c = cos(a.z); s = sin(a.z);\n\
         \x20   {o}.xy = mat2(c, -s, s, c) * {o}.xy;\n\
         }}\n",
        ctx.param("angle_x"),
        ctx.param("angle_y"),
        ctx.param("angle_z")
    )
}

fn emit_scale(ctx: &EmitContext<'_>) -> String {
    let o = ctx.output;
    let scale = ctx.param("scale");
    format!("{o}.xyz *= {scale};\n{o}.w *= abs({scale});\n")
}

fn emit_translate(ctx: &EmitContext<'_>) -> String {
    let o = ctx.output;
    format!(
        "{o}.xyz += vec3({}, {}, {});\n",
        ctx.param("x"),
        ctx.param("y"),
        ctx.param("z")
    )
}
