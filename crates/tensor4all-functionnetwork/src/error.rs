//! Error type of the function-network layer.

use thiserror::Error;

/// Configuration errors reported by builders, operators and network algebra.
#[derive(Debug, Error)]
pub enum FunctionNetworkError {
    /// A dimension has no digit indices in the map.
    #[error("dimension {0} has no indices")]
    UnknownDimension(usize),
    /// The operation needs a tree-shaped graph.
    #[error("graph is not a tree")]
    NotATree,
    /// The two networks live on different vertex sets.
    #[error("networks have different vertex sets")]
    VertexMismatch,
    /// The two networks carry different site indices at a vertex.
    #[error("site indices differ at vertex {0}")]
    SiteIndexMismatch(String),
    /// The two networks have different edge sets.
    #[error("networks have different edge sets")]
    EdgeMismatch,
    /// Stencil weights must be `[plus, identity, minus]`.
    #[error("stencil needs exactly 3 shift weights, got {0}")]
    InvalidShifts(usize),
    /// Inconsistent index map construction.
    #[error("invalid index map: {0}")]
    InvalidIndexMap(String),
    /// A site index has no value during evaluation.
    #[error("no value for site index {0}")]
    MissingSiteValue(String),
    /// Malformed arguments (length mismatches, empty inputs, out of range counts).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Failure reported by the tensor or network layer.
    #[error(transparent)]
    Network(#[from] anyhow::Error),
}

/// Result type of the function-network layer.
pub type Result<T> = std::result::Result<T, FunctionNetworkError>;
