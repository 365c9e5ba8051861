use derive_more::{Display, Error};

/// Failure taxonomy of the graph core and its file collaborators.
///
/// Every precondition violation fails fast before any mutating step, so an
/// error never leaves a graph in a partially updated state. None of these is
/// retried internally.
#[derive(Debug, Display, Error)]
pub enum CommEvalError {
    /// `add_vertex` is strict about existing vertices.
    #[display(fmt = "vertex {} already exists in graph", vertex)]
    DuplicateVertex { vertex: String },

    #[display(fmt = "vertex {} does not exist in graph", vertex)]
    VertexNotFound { vertex: String },

    #[display(fmt = "edge ({}, {}) already exists", from, to)]
    DuplicateEdge { from: String, to: String },

    #[display(fmt = "edge ({}, {}) does not exist", from, to)]
    EdgeNotFound { from: String, to: String },

    #[display(fmt = "edge weight {} is negative", weight)]
    NegativeWeight { weight: f64 },

    /// Self-loops would break the degree and total-weight bookkeeping.
    #[display(fmt = "self loop on vertex {} is not allowed", vertex)]
    SelfLoop { vertex: String },

    /// A line a file collaborator could not interpret at all.
    #[display(fmt = "malformed input: {}", detail)]
    MalformedInput { detail: String },

    /// A declared count in a structured file disagrees with its content.
    #[display(fmt = "{} count mismatch: declared {}, found {}", what, declared, found)]
    CountMismatch {
        what: String,
        declared: usize,
        found: usize,
    },

    #[display(fmt = "io failure: {}", _0)]
    Io(std::io::Error),
}

impl From<std::io::Error> for CommEvalError {
    fn from(err: std::io::Error) -> CommEvalError {
        CommEvalError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, CommEvalError>;
