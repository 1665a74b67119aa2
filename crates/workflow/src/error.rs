use oversight_core::error::CoreError;

/// Error type for engine operations.
///
/// Wraps [`CoreError`] for domain failures (not-found, invalid state,
/// permission denied, conflicts) and `sqlx::Error` for everything the
/// database layer surfaces.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for engine return values.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
