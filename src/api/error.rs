// API error module
// Maps every failure a handler can produce to a status code and JSON body

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW};
use hyper::{Response, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::http::{json_response, BodyError};
use crate::integrations::IntegrationError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Client supplied malformed or missing input (400)
    #[error("{error}: {message}")]
    Validation {
        error: &'static str,
        message: String,
    },
    /// Unexpected failure while running an integration (500)
    #[error("{error}: {message}{}", detail_suffix(.details))]
    Internal {
        error: &'static str,
        message: String,
        details: Option<String>,
    },
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },
    #[error("no route for {path}")]
    NotFound { path: String },
    #[error("method {method} not allowed")]
    MethodNotAllowed { method: String, allow: &'static str },
    #[error("request did not complete within {secs}s")]
    Timeout { secs: u64 },
}

fn detail_suffix(details: &Option<String>) -> String {
    details
        .as_deref()
        .map_or_else(String::new, |d| format!(" ({d})"))
}

impl ApiError {
    pub fn missing_image() -> Self {
        Self::Validation {
            error: "Missing image data",
            message: "Please provide base64 encoded image data".to_string(),
        }
    }

    pub fn invalid_image_format() -> Self {
        Self::Validation {
            error: "Invalid image format",
            message: "Image must be base64 encoded with data URL format".to_string(),
        }
    }

    pub fn invalid_severity() -> Self {
        Self::Validation {
            error: "Invalid severity level",
            message: "Severity must be Low, Medium, or High".to_string(),
        }
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::Validation {
            error: "Invalid request body",
            message: message.into(),
        }
    }

    pub fn prediction_failed(err: &IntegrationError) -> Self {
        Self::Internal {
            error: "Prediction failed",
            message: "An error occurred during image analysis".to_string(),
            details: Some(err.to_string()),
        }
    }

    pub fn spray_failed(err: &IntegrationError) -> Self {
        Self::Internal {
            error: "Sprayer activation failed",
            message: "An error occurred while activating the sprayer".to_string(),
            details: Some(err.to_string()),
        }
    }

    pub fn status_failed(err: &IntegrationError) -> Self {
        Self::Internal {
            error: "Status check failed",
            message: err.to_string(),
            details: None,
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// JSON body sent to the client
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Validation { error, message } => json!({ "error": error, "message": message }),
            Self::Internal {
                error,
                message,
                details: Some(details),
            } => json!({ "error": error, "message": message, "details": details }),
            Self::Internal {
                error,
                message,
                details: None,
            } => json!({ "error": error, "message": message }),
            Self::PayloadTooLarge { limit } => json!({
                "error": "Payload Too Large",
                "message": format!("Request body must not exceed {limit} bytes"),
            }),
            Self::NotFound { .. } => json!({
                "error": "Not Found",
                "available_endpoints": super::ENDPOINTS,
            }),
            Self::MethodNotAllowed { method, allow } => json!({
                "error": "Method Not Allowed",
                "message": format!("{method} is not supported here; allowed: {allow}"),
            }),
            Self::Timeout { secs } => json!({
                "error": "Request timeout",
                "message": format!("Request did not complete within {secs} seconds"),
            }),
        }
    }

    pub fn into_response(self, pretty: bool) -> Response<Full<Bytes>> {
        let mut response = json_response(self.status_code(), &self.body(), pretty);
        if let Self::MethodNotAllowed { allow, .. } = self {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

impl From<BodyError> for ApiError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::TooLarge { limit } => Self::PayloadTooLarge { limit },
            BodyError::Read(e) => Self::invalid_body(format!("Failed to read request body: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::missing_image().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::invalid_severity().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::PayloadTooLarge { limit: 1 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        let err = IntegrationError::Unavailable("boom".to_string());
        assert_eq!(
            ApiError::prediction_failed(&err).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_body_carries_details() {
        let err = IntegrationError::Unavailable("serial port closed".to_string());
        let body = ApiError::spray_failed(&err).body();
        assert_eq!(body["error"], "Sprayer activation failed");
        assert_eq!(body["details"], "unavailable: serial port closed");

        let body = ApiError::status_failed(&err).body();
        assert_eq!(body["message"], "unavailable: serial port closed");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_internal_display_includes_details() {
        let err = IntegrationError::Unavailable("model weights not loaded".to_string());
        assert_eq!(
            ApiError::prediction_failed(&err).to_string(),
            "Prediction failed: An error occurred during image analysis (unavailable: model weights not loaded)"
        );
        assert_eq!(
            ApiError::status_failed(&err).to_string(),
            "Status check failed: unavailable: model weights not loaded"
        );
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let resp = ApiError::MethodNotAllowed {
            method: "DELETE".to_string(),
            allow: "POST, OPTIONS",
        }
        .into_response(false);
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "POST, OPTIONS");
    }

    #[test]
    fn test_timeout_is_service_unavailable() {
        let err = ApiError::Timeout { secs: 30 };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.body()["error"], "Request timeout");
    }

    #[test]
    fn test_body_error_conversion() {
        let err: ApiError = BodyError::TooLarge { limit: 10 }.into();
        assert!(matches!(err, ApiError::PayloadTooLarge { limit: 10 }));
    }
}
