use crate::types::DbId;

/// Domain-level error taxonomy for the workflow engine.
///
/// Every failure the engine surfaces to a caller is one of these variants;
/// there is no retry or partial-success semantics.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// An operation was attempted from a status that disallows it, e.g.
    /// starting a non-DRAFT instance or completing a COMPLETED node.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The actor is not in the node's assignee set.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Unique-value collision, e.g. a duplicate template code.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
