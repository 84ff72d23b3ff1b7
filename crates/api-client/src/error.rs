//! Error types for the API client

use smokespot_core::ErrorCode;
use std::fmt;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// An insert that should return the stored row returned nothing
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// The server answered with a body that decodes but makes no sense
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing env var error
    pub fn missing_env(var: impl Into<String>) -> Self {
        Self::MissingEnvVar(var.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// HTTP status, when the server answered at all
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiResponse { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }

    /// Rejected for missing or expired credentials (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Map to the shared error code table
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) | Self::MissingEnvVar(_) => ErrorCode::ConfigError,
            Self::Request(e) if e.is_timeout() => ErrorCode::Timeout,
            _ if self.is_unauthorized() => ErrorCode::AuthRequired,
            _ => ErrorCode::DataApiError,
        }
    }
}

/// Error context for better debugging
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Request ID for correlation
    pub request_id: Option<String>,
    /// Endpoint that was called
    pub endpoint: String,
    /// HTTP method used
    pub method: String,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)?;
        if let Some(ref id) = self.request_id {
            write!(f, " (request_id: {id})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let not_found = ApiError::api_response(404, "missing");
        assert!(not_found.is_client_error());

        let down = ApiError::api_response(503, "unavailable");
        assert!(!down.is_client_error());
        assert_eq!(down.code(), ErrorCode::DataApiError);
    }

    #[test]
    fn test_unauthorized_maps_to_auth_required() {
        let err = ApiError::api_response(401, "JWT expired");
        assert!(err.is_unauthorized());
        assert_eq!(err.code(), ErrorCode::AuthRequired);
    }

    #[test]
    fn test_config_errors() {
        assert_eq!(ApiError::missing_env("SUPABASE_URL").code(), ErrorCode::ConfigError);
        assert!(ApiError::config("bad").to_string().contains("bad"));
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext {
            request_id: Some("abc".into()),
            endpoint: "/rest/v1/smoking_areas".into(),
            method: "GET".into(),
        };
        assert_eq!(ctx.to_string(), "GET /rest/v1/smoking_areas (request_id: abc)");
    }
}
