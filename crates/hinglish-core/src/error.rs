//! Error types for the Hinglish classifier

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type shared by the classifier and server crates
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rule or classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Remote backend errors (local inference server, hosted LLM, transcription)
    #[error("backend error ({backend}): {message}")]
    Backend { backend: String, message: String },

    /// Local model loading or inference errors
    #[error("model error: {0}")]
    Model(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new backend error tagged with the backend name
    pub fn backend(backend: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: msg.into(),
        }
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error came from an unreachable or failing remote backend
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display_names_backend() {
        let err = Error::backend("ollama", "connection refused");
        assert_eq!(err.to_string(), "backend error (ollama): connection refused");
        assert!(err.is_backend());
        assert!(!Error::config("bad").is_backend());
    }
}
