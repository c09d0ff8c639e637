//! Unified error types for mcp-conan.
//!
//! Upstream failures are classified by the HTTP client at the point of
//! failure and carried here as discrete variants; nothing downstream infers
//! a kind from message text. A package that does not exist upstream is NOT
//! an error: lookups surface it as a successful `exists: false` response.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the mcp-conan server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., malformed package name).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// An explicitly requested version is absent from the recipe.
    #[error("VERSION_NOT_FOUND: version '{version}' not found for package '{package}'")]
    VersionNotFound { package: String, version: String },

    /// Upstream returned HTTP 429.
    #[error("RATE_LIMITED: upstream rate limit exceeded")]
    RateLimited {
        /// Retry-After hint in seconds, when the upstream sent one.
        retry_after: Option<u64>,
    },

    /// Upstream returned a 5xx status.
    #[error("SERVICE_UNAVAILABLE: upstream returned HTTP {status}")]
    ServiceUnavailable { status: u16 },

    /// Connection-level failure reaching the upstream.
    #[error("NETWORK_FAILURE: {0}")]
    NetworkFailure(String),

    /// The upstream call exceeded its timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    Timeout(String),

    /// Any other non-success upstream status.
    #[error("HTTP_ERROR: upstream returned HTTP {status}")]
    Upstream { status: u16 },

    /// Failure with no more specific classification.
    #[error("UNKNOWN: {0}")]
    Unknown(String),
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::VersionNotFound { .. } => -32001,
            Error::RateLimited { .. } => -32002,
            Error::ServiceUnavailable { .. } => -32003,
            Error::NetworkFailure(_) => -32004,
            Error::Timeout(_) => -32005,
            Error::Upstream { .. } => -32006,
            Error::Unknown(_) => -32000,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::VersionNotFound { package: "zlib".into(), version: "9.9".into() };
        assert!(err.to_string().contains("VERSION_NOT_FOUND"));
        assert!(err.to_string().contains("zlib"));
        assert!(err.to_string().contains("9.9"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::InvalidInput("package name cannot be empty".into());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32602);

        let err = Error::RateLimited { retry_after: Some(30) };
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32002);
    }
}
