//! Error types for netmap
//!
//! This module provides unified error handling across the editor core,
//! covering form validation, canvas lookups, edit sessions, remote store
//! failures and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for netmap
#[derive(Debug, Error)]
pub enum NetmapError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error (blocks submission, no remote call made)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connection between nodes the persisted schema cannot represent
    #[error("Invalid connection from '{source_id}' to '{target_id}': {message}")]
    InvalidConnection {
        source_id: String,
        target_id: String,
        message: String,
    },

    /// Identifier without a recognised `device-`/`group-`/`edge-` prefix
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Node not present on the canvas
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Edge not present on the canvas
    #[error("Connection not found: {0}")]
    EdgeNotFound(String),

    // ========================================================================
    // Edit Session Errors
    // ========================================================================
    /// Save or delete requested while no editor is open
    #[error("No edit session is open")]
    NoActiveSession,

    /// Save data does not match the kind of the open session
    #[error("Edit session mismatch: editing a {open}, received {received} data")]
    SessionKindMismatch { open: String, received: String },

    // ========================================================================
    // Remote Store Errors
    // ========================================================================
    /// A remote call failed (network, HTTP status, decoding, missing row)
    #[error("Remote store error: {0}")]
    Remote(String),

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl NetmapError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        NetmapError::Validation(msg.into())
    }

    /// Create an invalid connection error
    pub fn invalid_connection(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        NetmapError::InvalidConnection {
            source_id: source_id.into(),
            target_id: target_id.into(),
            message: msg.into(),
        }
    }

    /// Create a remote store error
    pub fn remote(msg: impl Into<String>) -> Self {
        NetmapError::Remote(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        NetmapError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            NetmapError::Validation(_)
                | NetmapError::InvalidConnection { .. }
                | NetmapError::InvalidIdentifier(_)
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            NetmapError::NodeNotFound(_) | NetmapError::EdgeNotFound(_)
        )
    }

    /// Check if this error came from the remote store
    pub fn is_remote(&self) -> bool {
        matches!(self, NetmapError::Remote(_))
    }

    /// Text shown to the user in a notice
    ///
    /// Plain validation messages are shown as written, without the
    /// "Validation error:" label.
    pub fn notice_text(&self) -> String {
        match self {
            NetmapError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias using NetmapError
pub type NetmapResult<T> = Result<T, NetmapError>;

// ============================================================================
// Tests
// ============================================================================
