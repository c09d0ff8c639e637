//! Registry client error types.

use std::sync::Arc;

/// Errors from the recipe-index contents API client.
///
/// Each variant is assigned at the point of failure from the HTTP status or
/// transport error; callers match on variants, never on message text.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The recipe folder for this package does not exist (HTTP 404).
    #[error("package '{0}' not found")]
    PackageNotFound(String),

    /// Rate limited by the upstream API (HTTP 429).
    #[error("rate limited: too many requests")]
    RateLimited {
        /// Parsed Retry-After header, in seconds.
        retry_after: Option<u64>,
    },

    /// Upstream returned a 5xx status.
    #[error("service unavailable: HTTP {status}")]
    ServiceUnavailable { status: u16 },

    /// Any other non-success HTTP status.
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl RegistryError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Not-found and other 4xx responses are final; rate limits, 5xx,
    /// timeouts, and transport failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::RateLimited { .. }
                | RegistryError::ServiceUnavailable { .. }
                | RegistryError::Timeout
                | RegistryError::Network(_)
        )
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { RegistryError::Timeout } else { RegistryError::Network(Arc::new(err)) }
    }
}
