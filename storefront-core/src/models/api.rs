//! The commerce API result contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a commerce API call.
pub type ApiResult<T> = Result<T, ApiFailure>;

/// Structured failure returned for non-2xx responses and transport errors.
///
/// Serializes as `{ "success": false, "message": ..., "status": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    /// Always false.
    #[serde(default)]
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// HTTP status, absent for transport failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ApiFailure {
    /// Creates a failure for an HTTP status.
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            success: false,
            message: message.into(),
            status: Some(status),
        }
    }

    /// Creates a failure that never reached the server.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            status: None,
        }
    }

    /// Returns true for a 401 response.
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    /// Returns true when the failure is likely to clear on retry.
    pub fn is_transient(&self) -> bool {
        match self.status {
            None => true,
            Some(code) => code == 408 || code == 429 || code >= 500,
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiFailure {}
