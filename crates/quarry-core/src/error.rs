//! Error types for the Quarry pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every Quarry crate.
///
/// Variants follow the failure taxonomy of the pipeline: configuration problems
/// are fatal at startup, search failures are recovered locally, completion
/// failures surface to the caller.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuarryError {
    /// Missing credential or invalid configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The search provider failed or returned a non-success status
    #[error("Search unavailable: {message}")]
    SearchUnavailable {
        message: String,
        status: Option<u16>,
    },

    /// The completion provider failed (auth, rate limit, network, empty output)
    #[error("Completion unavailable: {message}")]
    CompletionUnavailable {
        message: String,
        status: Option<u16>,
        retryable: bool,
    },

    /// Model output could not be parsed as a list of search queries
    #[error("Malformed query list: {0}")]
    MalformedQueryList(String),

    /// Caller supplied an empty topic, empty instruction, or similar
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Document export failed
    #[error("Export error: {0}")]
    Export(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuarryError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a SearchUnavailable error
    pub fn search_unavailable(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::SearchUnavailable {
            message: message.into(),
            status,
        }
    }

    /// Creates a CompletionUnavailable error
    pub fn completion_unavailable(
        message: impl Into<String>,
        status: Option<u16>,
        retryable: bool,
    ) -> Self {
        Self::CompletionUnavailable {
            message: message.into(),
            status,
            retryable,
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a search failure
    pub fn is_search_unavailable(&self) -> bool {
        matches!(self, Self::SearchUnavailable { .. })
    }

    /// Check if this is a completion failure
    pub fn is_completion_unavailable(&self) -> bool {
        matches!(self, Self::CompletionUnavailable { .. })
    }

    /// Returns true when a caller could reasonably retry the failed call.
    ///
    /// Only completion failures carry this information; the pipeline itself
    /// never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CompletionUnavailable {
                retryable: true,
                ..
            }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for QuarryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for QuarryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for QuarryError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for QuarryError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<String> for QuarryError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, QuarryError>`.
pub type Result<T> = std::result::Result<T, QuarryError>;
