use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{kind} not found: {id}")]
    InputNotFound { kind: String, id: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Upstream data store unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BenchmarkError {
    pub fn entity_not_found(id: &str) -> Self {
        BenchmarkError::InputNotFound {
            kind: "Entity".into(),
            id: id.to_string(),
        }
    }

    /// True for failures a caller may retry (the store, not the request, failed).
    pub fn is_retryable(&self) -> bool {
        matches!(self, BenchmarkError::UpstreamUnavailable(_))
    }
}

impl From<serde_json::Error> for BenchmarkError {
    fn from(e: serde_json::Error) -> Self {
        BenchmarkError::SerializationError(e.to_string())
    }
}
