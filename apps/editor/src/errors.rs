use thiserror::Error;

/// Library-level error type.
///
/// Validation errors are raised before any network call. Everything else
/// originates at the HTTP boundary and is treated as transient by callers.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EditorError {
    /// True for failures caused by the backend or the network rather than the caller.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            EditorError::NotFound(_)
                | EditorError::Api { .. }
                | EditorError::Http(_)
                | EditorError::Parse(_)
        )
    }

    /// True when a retry may succeed: transport failures, timeouts, 429 and 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            EditorError::Http(_) => true,
            EditorError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
