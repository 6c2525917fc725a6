//! Gateway error types

use netmap_core::NetmapError;
use thiserror::Error;

/// Errors raised by a remote store call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never got an answer (connect failure, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The store answered with a non-success status
    #[error("HTTP {0} error: {1}")]
    Http(u16, String),

    /// The response body could not be decoded into rows
    #[error("Decode error: {0}")]
    Decode(String),

    /// An update or delete matched no row (e.g. a transient id)
    #[error("No row with id '{id}' in table '{table}'")]
    NotFound { table: String, id: String },
}

impl GatewayError {
    pub fn not_found(table: impl Into<String>, id: impl Into<String>) -> Self {
        GatewayError::NotFound {
            table: table.into(),
            id: id.into(),
        }
    }

    /// HTTP status of the failure, if the store answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http(code, _) => Some(*code),
            GatewayError::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

impl From<GatewayError> for NetmapError {
    fn from(err: GatewayError) -> Self {
        NetmapError::Remote(err.to_string())
    }
}

/// Result type for remote store operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            GatewayError::Http(409, "duplicate key".into()).to_string(),
            "HTTP 409 error: duplicate key"
        );
        assert_eq!(
            GatewayError::not_found("devices", "1700000000000").to_string(),
            "No row with id '1700000000000' in table 'devices'"
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(GatewayError::Http(500, String::new()).status(), Some(500));
        assert_eq!(GatewayError::not_found("devices", "x").status(), Some(404));
        assert_eq!(GatewayError::Network("refused".into()).status(), None);
    }

    #[test]
    fn test_into_netmap_error() {
        let err: NetmapError = GatewayError::Network("refused".into()).into();
        assert!(err.is_remote());
        assert_eq!(err.to_string(), "Remote store error: Network error: refused");
    }
}
