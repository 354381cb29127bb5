use thiserror::Error;

use hearth_core::error::HearthError;

/// Errors that can occur in the insight pipeline.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("graph error: {0}")]
    Graph(String),
    #[error("generator error: {0}")]
    Generator(String),
    #[error("insufficient data: {0}")]
    InsufficientData(String),
}

impl From<HearthError> for InsightError {
    fn from(err: HearthError) -> Self {
        match err {
            HearthError::Graph(msg) => InsightError::Graph(msg),
            other => InsightError::Storage(other.to_string()),
        }
    }
}

impl From<InsightError> for HearthError {
    fn from(err: InsightError) -> Self {
        HearthError::Insight(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = InsightError::Storage("db offline".to_string());
        assert_eq!(e.to_string(), "storage error: db offline");
        let e = InsightError::InsufficientData("need 2 children".to_string());
        assert_eq!(e.to_string(), "insufficient data: need 2 children");
    }

    #[test]
    fn test_from_hearth_error() {
        let e: InsightError = HearthError::Graph("bad edge".to_string()).into();
        assert!(matches!(e, InsightError::Graph(_)));
        let e: InsightError = HearthError::Storage("disk".to_string()).into();
        assert!(matches!(e, InsightError::Storage(_)));
    }

    #[test]
    fn test_into_hearth_error() {
        let e: HearthError = InsightError::Generator("boom".to_string()).into();
        assert!(matches!(e, HearthError::Insight(_)));
    }
}
