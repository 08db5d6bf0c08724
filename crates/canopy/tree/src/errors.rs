//! Tree engine error types

/// Errors raised by tree transforms and utilities.
///
/// All errors are raised synchronously at the point of detection and propagate
/// to the immediate caller; the engine performs no retries and no
/// partial-failure recovery.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("recursion depth exceeded the limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("key '{key}' does not match the required pattern")]
    PatternMismatch { key: String },

    #[error("missing key: '{key}'")]
    MissingKey { key: String },

    #[error("invalid replacement pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("input cannot be decomposed as a tree: {reason}")]
    UnsupportedShape { reason: String },

    #[error("string leaf is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Result type alias for tree operations
pub type TreeResult<T> = Result<T, TreeError>;
