//! Error types for artifact loading, inference, collaborators, and rendering.

/// A model or encoder file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

/// Inference failed on a loaded model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("model output {index} is not a valid class code: {value}")]
    InvalidCode { index: usize, value: f64 },
}

/// Errors from an external HTTP collaborator (dish detector, assistant).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("service error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// A report could not be rendered.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}
