//! Uniform result envelope for the public entry points.
//!
//! Nothing in the pipeline propagates an unhandled error to the caller:
//! every facade method returns `{success, data | error}`.

use serde::{Deserialize, Serialize};

use hearth_core::error::HearthError;

/// The envelope every public entry point returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Fold a `Result` into the envelope.
    pub fn from_result(result: Result<T, HearthError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let response = ApiResponse::ok(42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_err_envelope() {
        let response: ApiResponse<()> = ApiResponse::err("boom");
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_from_result() {
        let ok = ApiResponse::from_result(Ok("fine"));
        assert!(ok.success);

        let err: ApiResponse<&str> =
            ApiResponse::from_result(Err(HearthError::NotFound("doc".to_string())));
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("Not found: doc"));
    }

    #[test]
    fn test_error_field_omitted_in_json() {
        let response = ApiResponse::ok(1);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"success":true,"data":1}"#);

        let response: ApiResponse<i32> = ApiResponse::err("bad");
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"bad"}"#);
    }
}
