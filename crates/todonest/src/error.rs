use thiserror::Error;

use crate::tags::TagValidationError;

#[derive(Error, Debug)]
pub enum TodoError {
    /// A referenced todo, list or pinned entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Self-parenting or a move that would create a cycle.
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// The resulting position would nest deeper than the configured maximum.
    #[error("Depth exceeded: {0}")]
    DepthExceeded(String),

    /// Structurally disallowed action, e.g. deleting the primary list.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid tag '{name}': {reason}")]
    InvalidTag {
        name: String,
        reason: TagValidationError,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure reported by a store while loading or committing.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

pub type Result<T> = std::result::Result<T, TodoError>;
