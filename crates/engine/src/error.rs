use agora_core::error::CoreError;

/// Errors produced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain rule rejected the request.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed or could not be reached. Safe to retry.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl EngineError {
    pub(crate) fn not_found(entity: &'static str, id: agora_core::types::DbId) -> Self {
        Self::Core(CoreError::NotFound { entity, id })
    }
}
