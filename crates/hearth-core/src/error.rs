use thiserror::Error;

/// Top-level error type for the Hearth system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for HearthError` so that the `?` operator works
/// seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HearthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Similarity error: {0}")]
    Similarity(String),

    #[error("Insight error: {0}")]
    Insight(String),

    #[error("Suggestion error: {0}")]
    Suggestion(String),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for HearthError {
    fn from(err: toml::de::Error) -> Self {
        HearthError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for HearthError {
    fn from(err: toml::ser::Error) -> Self {
        HearthError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for HearthError {
    fn from(err: serde_json::Error) -> Self {
        HearthError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Hearth operations.
pub type Result<T> = std::result::Result<T, HearthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HearthError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_variants() {
        let cases: Vec<(HearthError, &str)> = vec![
            (
                HearthError::Storage("disk full".into()),
                "Storage error: disk full",
            ),
            (
                HearthError::Graph("dangling edge".into()),
                "Graph error: dangling edge",
            ),
            (
                HearthError::Extraction("no payload".into()),
                "Extraction error: no payload",
            ),
            (
                HearthError::Similarity("empty vector".into()),
                "Similarity error: empty vector",
            ),
            (
                HearthError::Insight("generator panic".into()),
                "Insight error: generator panic",
            ),
            (
                HearthError::Suggestion("no snapshot".into()),
                "Suggestion error: no snapshot",
            ),
            (
                HearthError::Schedule("bad frequency".into()),
                "Schedule error: bad frequency",
            ),
            (
                HearthError::NotFound("document abc".into()),
                "Not found: document abc",
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HearthError = io_err.into();
        assert!(matches!(err, HearthError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(err.is_err());
        let hearth_err: HearthError = err.unwrap_err().into();
        assert!(matches!(hearth_err, HearthError::Serialization(_)));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(err.is_err());
        let hearth_err: HearthError = err.unwrap_err().into();
        assert!(matches!(hearth_err, HearthError::Config(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }
        assert_eq!(inner().unwrap(), "success");
    }
}
