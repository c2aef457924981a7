use thiserror::Error;

/// Errors from memory pipeline operations.
///
/// The first four variants carry user-facing remediation messages and map
/// to client errors at the HTTP layer (400/404); the last three wrap
/// external collaborator failures and map to 500.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Missing/empty required input (e.g., empty target list).
    #[error("{0}")]
    Validation(String),

    /// No owned record matches the request.
    #[error("{0}")]
    NotFound(String),

    /// The language collaborator could not extract a clean item/location
    /// pair from a sentence.
    #[error("{0}")]
    Ambiguous(String),

    /// The classifier returned no operation or an unrecognized one.
    #[error("{0}")]
    UnrecognizedIntent(String),

    /// Language understanding call failed.
    #[error("language model error: {0}")]
    Inference(String),

    /// Embedding service call failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Vector index call failed.
    #[error("vector index error: {0}")]
    Index(String),
}

impl MemoryError {
    /// Whether this error is caused by the caller's input rather than an
    /// external service failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MemoryError::Validation(_)
                | MemoryError::NotFound(_)
                | MemoryError::Ambiguous(_)
                | MemoryError::UnrecognizedIntent(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(MemoryError::Validation("empty".into()).is_client_error());
        assert!(MemoryError::NotFound("nothing".into()).is_client_error());
        assert!(MemoryError::Ambiguous("unclear".into()).is_client_error());
        assert!(!MemoryError::Index("timeout".into()).is_client_error());
        assert!(!MemoryError::Inference("bad json".into()).is_client_error());
    }

    #[test]
    fn test_display_passes_user_message_through() {
        let err = MemoryError::NotFound("No memories found.".into());
        assert_eq!(err.to_string(), "No memories found.");

        let err = MemoryError::Index("connection refused".into());
        assert_eq!(err.to_string(), "vector index error: connection refused");
    }
}
