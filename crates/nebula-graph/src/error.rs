#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("node already exists: {key}")]
    DuplicateNode { key: String },

    #[error("edge already exists: {key}")]
    DuplicateEdge { key: String },

    #[error("edge {edge} references a missing node: {node}")]
    MissingNode { edge: String, node: String },

    #[error("self-loops are not allowed on this graph (edge {edge} on {node})")]
    SelfLoop { edge: String, node: String },

    #[error("parallel edges are not allowed on a simple graph (edge {edge}: {from} -> {to})")]
    ParallelEdge { edge: String, from: String, to: String },
}

pub type Result<T> = std::result::Result<T, Error>;
