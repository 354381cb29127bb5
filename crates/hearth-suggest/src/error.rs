use thiserror::Error;

use hearth_core::error::HearthError;

/// Errors that can occur in the suggestion engine.
#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("generator error: {0}")]
    Generator(String),
    #[error("relevance model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("invalid feedback: {0}")]
    InvalidFeedback(String),
}

impl From<HearthError> for SuggestError {
    fn from(err: HearthError) -> Self {
        SuggestError::Storage(err.to_string())
    }
}

impl From<SuggestError> for HearthError {
    fn from(err: SuggestError) -> Self {
        HearthError::Suggestion(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = SuggestError::ModelUnavailable("not initialized".to_string());
        assert_eq!(
            e.to_string(),
            "relevance model unavailable: not initialized"
        );
        let e = SuggestError::InvalidFeedback("rating 9".to_string());
        assert_eq!(e.to_string(), "invalid feedback: rating 9");
    }

    #[test]
    fn test_conversions() {
        let e: SuggestError = HearthError::Storage("disk".to_string()).into();
        assert!(matches!(e, SuggestError::Storage(_)));
        let e: HearthError = SuggestError::Generator("boom".to_string()).into();
        assert!(matches!(e, HearthError::Suggestion(_)));
    }
}
