//! Error types for the common library.
//!
//! One hierarchy, built with `thiserror`, covers every failure a tool
//! invocation can hit. The front-end turns any of them into a soft error
//! by rendering the `Display` output.
//!
//! # Error Categories
//!
//! - `ConfigError`: neither backend credential is configured, or a value is invalid
//! - `AuthError`: Application Default Credentials failures (Vertex AI backend)
//! - `Error::Api`: non-success replies or transport failures from the Gemini API
//! - `Error::MalformedResponse`: the reply lacks the expected structure
//! - `Error::ContentRefused`: the reply carries no image, usually a safety refusal
//! - `Error::Validation`: input validation failures
//! - `Error::Io`: directory creation or file write failures
//! - `Error::Other`: anything else raised in the call chain

use thiserror::Error;

/// Unified error type for the Organon MCP crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing credentials, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Authentication errors (ADC not configured, token refresh failures)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// API errors with endpoint and HTTP status context.
    ///
    /// A status code of 0 means the request never produced an HTTP reply.
    #[error("API error for {endpoint} (HTTP {status_code}): {message}")]
    Api {
        /// The API endpoint that was called
        endpoint: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Error message from the API or describing the failure
        message: String,
    },

    /// The vendor reply lacks the expected structure
    #[error("{0}")]
    MalformedResponse(String),

    /// The vendor replied but supplied no image payload
    #[error("{0}")]
    ContentRefused(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Any other failure, carried as its message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new API error with endpoint, status code, and message.
    ///
    /// # Example
    ///
    /// ```
    /// use organon_mcp_common::error::Error;
    ///
    /// let err = Error::api(
    ///     "https://generativelanguage.googleapis.com/v1beta/models/m:generateContent",
    ///     429,
    ///     "Resource exhausted"
    /// );
    /// assert!(err.to_string().contains("generativelanguage"));
    /// assert!(err.to_string().contains("429"));
    /// ```
    pub fn api(endpoint: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            endpoint: endpoint.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a new malformed-response error.
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Error::MalformedResponse(message.into())
    }

    /// Create a new content-refusal error.
    pub fn content_refused(message: impl Into<String>) -> Self {
        Error::ContentRefused(message.into())
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use organon_mcp_common::error::Error;
    ///
    /// let err = Error::validation("prompt cannot be empty");
    /// assert!(err.to_string().contains("prompt cannot be empty"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Wrap an arbitrary failure message.
    ///
    /// # Example
    ///
    /// ```
    /// use organon_mcp_common::error::Error;
    ///
    /// let err = Error::other("string error");
    /// assert_eq!(err.to_string(), "string error");
    /// ```
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }
}

/// Configuration errors.
///
/// Raised while resolving the backend from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither backend credential is configured
    #[error("Either {api_key_var} (AI Studio) or {project_var} (Vertex AI) is required.")]
    MissingCredentials {
        /// Variable enabling the API-key backend
        api_key_var: &'static str,
        /// Variable enabling the project/location backend
        project_var: &'static str,
    },

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Authentication errors.
///
/// These occur while obtaining tokens from Application Default Credentials
/// for the Vertex AI backend.
#[derive(Debug, Error)]
pub enum AuthError {
    /// ADC is not configured
    #[error("ADC not configured. Run 'gcloud auth application-default login' or set GOOGLE_APPLICATION_CREDENTIALS")]
    NotConfigured,

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
}

impl AuthError {
    /// Create a new token refresh failed error.
    pub fn refresh_failed(message: impl Into<String>) -> Self {
        AuthError::RefreshFailed(message.into())
    }
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_includes_endpoint_and_status() {
        let err = Error::api("https://aiplatform.googleapis.com/v1/generate", 500, "Internal error");
        let msg = err.to_string();
        assert!(msg.contains("aiplatform.googleapis.com"), "Should contain endpoint");
        assert!(msg.contains("500"), "Should contain status code");
        assert!(msg.contains("Internal error"), "Should contain message");
    }

    #[test]
    fn test_missing_credentials_names_both_alternatives() {
        let err = ConfigError::MissingCredentials {
            api_key_var: "GEMINI_API_KEY",
            project_var: "VERTEX_PROJECT",
        };
        assert_eq!(
            err.to_string(),
            "Either GEMINI_API_KEY (AI Studio) or VERTEX_PROJECT (Vertex AI) is required."
        );
    }

    #[test]
    fn test_error_from_config_error() {
        let err: Error = ConfigError::invalid_value("VERTEX_LOCATION", "contains '/'").into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("VERTEX_LOCATION"));
    }

    #[test]
    fn test_error_from_auth_error() {
        let err: Error = AuthError::NotConfigured.into();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains("ADC"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_response_errors_display_message_verbatim() {
        assert_eq!(
            Error::malformed_response("No response parts from Gemini API").to_string(),
            "No response parts from Gemini API"
        );
        assert_eq!(Error::content_refused("blocked").to_string(), "blocked");
    }

    #[test]
    fn test_validation_error() {
        let err = Error::validation("output_path cannot be empty");
        let msg = err.to_string();
        assert!(msg.contains("Validation"));
        assert!(msg.contains("output_path"));
    }

    #[test]
    fn test_refresh_failed() {
        let err = AuthError::refresh_failed("metadata server unreachable");
        assert!(err.to_string().contains("metadata server unreachable"));
    }
}
