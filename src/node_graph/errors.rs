use std::fmt;

// ============================================================================
// Edit rejections
// ============================================================================

/// A graph mutation that was refused. The graph is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Node id does not exist in the graph
    UnknownNode(String),
    /// Node id is already taken
    DuplicateNode(String),
    /// Sentinel nodes cannot be removed or edited
    SentinelLocked(String),
    /// Edge would flow into the iteration input or out of the final output
    InvalidSentinelEdge { source: String, target: String },
    SelfLoop(String),
    DuplicateEdge { source: String, target: String },
    /// Edge would close a cycle
    WouldCreateCycle { source: String, target: String },
    /// Target input already has an inbound edge
    InputOccupied { node_id: String },
    UnknownEdge(String),
    UnknownInput { node_id: String, input_id: String },
    InvalidCondition { modulus: u32, remainder: u32 },
    NotFinite { node_id: String, input_id: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::UnknownNode(id) => write!(f, "Unknown node '{}'", id),
            GraphError::DuplicateNode(id) => write!(f, "Node '{}' already exists", id),
            GraphError::SentinelLocked(id) => write!(f, "Sentinel node '{}' cannot be modified", id),
            GraphError::InvalidSentinelEdge { source, target } => {
                write!(f, "Edge {} -> {} runs against a sentinel node", source, target)
            }
            GraphError::SelfLoop(id) => write!(f, "Node '{}' cannot connect to itself", id),
            GraphError::DuplicateEdge { source, target } => {
                write!(f, "Edge {} -> {} already exists", source, target)
            }
            GraphError::WouldCreateCycle { source, target } => {
                write!(f, "Edge {} -> {} would create a cycle", source, target)
            }
            GraphError::InputOccupied { node_id } => {
                write!(f, "Node '{}' has no free input", node_id)
            }
            GraphError::UnknownEdge(id) => write!(f, "Unknown edge '{}'", id),
            GraphError::UnknownInput { node_id, input_id } => {
                write!(f, "Node '{}' has no input '{}'", node_id, input_id)
            }
            GraphError::InvalidCondition { modulus, remainder } => write!(
                f,
                "Condition remainder {} is outside [0, {})",
                remainder, modulus
            ),
            GraphError::NotFinite { node_id, input_id } => {
                write!(f, "Value for {}.{} is not finite", node_id, input_id)
            }
        }
    }
}

impl std::error::Error for GraphError {}

// ============================================================================
// Compile failures
// ============================================================================

/// A compile pass that must not produce any shader text.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Linearizer exhausted its ready set with nodes still waiting on inputs
    CycleDetected { remaining: Vec<String> },
    UnknownNodeType { node_id: String, type_id: String },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::CycleDetected { remaining } => write!(
                f,
                "Internal error: graph has a cycle through [{}]. Compile aborted.",
                remaining.join(", ")
            ),
            CompileError::UnknownNodeType { node_id, type_id } => {
                write!(f, "Node '{}' has unknown type '{}'", node_id, type_id)
            }
        }
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Graph(GraphError),
    Compile(CompileError),
}

impl From<GraphError> for SessionError {
    fn from(e: GraphError) -> Self {
        SessionError::Graph(e)
    }
}

impl From<CompileError> for SessionError {
    fn from(e: CompileError) -> Self {
        SessionError::Compile(e)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Graph(e) => write!(f, "Edit rejected: {}", e),
            SessionError::Compile(e) => write!(f, "Compile failed: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}
