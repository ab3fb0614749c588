mod binding;
mod cycle;
mod diff;
mod emit_context;
mod emitter;
mod errors;
mod graph;
mod linearize;
mod session;

pub mod nodes;

pub use crate::models::schema::*;
pub use binding::{glsl_float, next_binding, resolve, resolve_value, toggle_binding, ParamRef};
pub use cycle::would_create_cycle;
pub use diff::{is_exactly_equal, is_structurally_equal};
pub use emit_context::EmitContext;
pub use emitter::{emit, param_values, STATE_TYPE};
pub use errors::{CompileError, GraphError, SessionError};
pub use linearize::{graph_from_pipeline, linearize};
pub use session::{EditOutcome, GraphEdit, GraphSession};

#[cfg(test)]
mod tests;
