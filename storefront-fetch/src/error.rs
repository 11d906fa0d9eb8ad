//! Fetch error types.

use storefront_core::ApiFailure;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for building and running API requests.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Invalid base URL or endpoint path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response could not be mapped into domain types.
    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] storefront_core::CoreError),
}

impl From<FetchError> for ApiFailure {
    fn from(err: FetchError) -> Self {
        ApiFailure::network(err.to_string())
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
