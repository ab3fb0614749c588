use super::*;

pub fn get_node_types() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition {
            id: "mandelbulb",
            name: "Mandelbulb",
            description: "Spherical power map with derivative tracking.",
            category: "Fractals",
            arity: NodeArity::Single,
            inputs: vec![InputSpec::new("power", "Power", 1.0, 16.0, 0.1, 8.0).clamped(1.0, 32.0)],
            emit: emit_mandelbulb,
        },
        NodeDefinition {
            id: "menger_scale",
            name: "Menger Scale",
            description: "Scales about an offset corner, as in the Menger sponge iteration.",
            category: "Fractals",
            arity: NodeArity::Single,
            inputs: vec![
                InputSpec::new("scale", "Scale", 1.0, 4.0, 0.01, 3.0),
                InputSpec::new("offset", "Offset", 0.0, 2.0, 0.01, 1.0),
            ],
            emit: emit_menger_scale,
        },
    ]
}

fn emit_mandelbulb(ctx: &EmitContext<'_>) -> String {
    let o = ctx.output;
    let power = ctx.param("power");
    format!(
        "{{\n\
         \x20   float r = length({o}.xyz);\n\
         \x20   float theta = acos(clamp({o}.z / max(r, 1e-6), -1.0, 1.0)) * {power};\n\
         \x20   float phi = atan({o}.y, {o}.x) * {power};\n\
         \x20   {o}.w = pow(r, {power} - 1.0) * {power} * {o}.w + 1.0;\n\
         \x20   {o}.xyz = pow(r, {power}) * vec3(sin(theta) * cos(phi), sin(phi) * sin(theta), cos(theta));\n\
         }}\n"
    )
}

fn emit_menger_scale(ctx: &EmitContext<'_>) -> String {
    let o = ctx.output;
    let scale = ctx.param("scale");
    let offset = ctx.param("offset");
    format!(
        "{o}.xyz = {o}.xyz * {scale} - vec3({offset}) * ({scale} - 1.0);\n\
         if ({o}.z < -0.5 * {offset} * ({scale} - 1.0)) {o}.z += {offset} * ({scale} - 1.0);\n\
         {o}.w *= {scale};\n"
    )
}
