#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Incomplete state: {0}")]
    IncompleteState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Downstream error: {0}")]
    Downstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
