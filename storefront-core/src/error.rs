//! Core error types for the storefront.

use thiserror::Error;

/// Core error type for storefront operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field was absent from an API payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Invalid data from API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unknown currency code.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Unknown listing slot name.
    #[error("Unknown listing slot: {0}")]
    UnknownSlot(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
