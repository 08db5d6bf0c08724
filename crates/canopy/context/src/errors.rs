//! Context layer error types

use canopy_tree::TreeError;

/// Errors raised during context resolution and entity wrapping.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("either a whole root value or keyed entries may be supplied, not both")]
    ConflictingConstructionArguments,

    #[error("input cannot be treated as a tree: {reason}")]
    UnsupportedShape { reason: String },

    #[error("context injection exceeded the depth limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result type alias for context operations
pub type ContextResult<T> = Result<T, ContextError>;
