//! Error types for the collaborators Herald talks to.
//!
//! These cover the two outward seams of the core: the messaging surface
//! ([`Bot`](crate::Bot)) and the configuration store
//! ([`ConfigStore`](crate::ConfigStore)). Dispatch-level errors live in
//! `herald-framework`.

use thiserror::Error;

// =============================================================================
// API Errors
// =============================================================================

/// Errors returned by the messaging surface.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The bot is not connected.
    #[error("bot is not connected")]
    NotConnected,
    /// The API call timed out.
    #[error("API call timed out")]
    Timeout,
    /// The referenced channel does not exist or is not visible to the bot.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    /// The referenced message does not exist.
    #[error("unknown message: {0}")]
    UnknownMessage(String),
    /// The platform rejected the request.
    #[error("API error ({code}): {message}")]
    Rejected { code: i64, message: String },
    /// Other error.
    #[error("{0}")]
    Other(String),
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors returned by a configuration store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A document path was malformed.
    #[error("invalid document path: {0}")]
    InvalidPath(String),

    /// A document did not have the expected shape.
    #[error("malformed document at '{path}': {reason}")]
    Malformed {
        /// The document path.
        path: String,
        /// Why decoding failed.
        reason: String,
    },
}

impl StoreError {
    /// Creates a malformed-document error.
    pub fn malformed(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for messaging API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
