pub mod compile_worker;
pub mod models;
pub mod node_graph;
pub mod settings;

pub use compile_worker::{CompileEvent, CompileWorker, ShaderBackend};
pub use node_graph::{
    emit, graph_from_pipeline, is_exactly_equal, is_structurally_equal, linearize,
    would_create_cycle, CompileError, EditOutcome, GraphEdit, GraphError, GraphSession,
    SessionError,
};
pub use settings::{CompileMode, CompilerSettings};
