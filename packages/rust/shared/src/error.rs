//! Error types for distill.
//!
//! Library crates use [`DistillError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all distill operations.
#[derive(Debug, thiserror::Error)]
pub enum DistillError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The document could not be retrieved.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// An address could not be mapped to a storage path.
    #[error("cannot map '{address}' to a path: {reason}")]
    PathMapping { address: String, reason: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input could not be interpreted (bad URL, unreadable input, ...).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A worker task ended abnormally (panicked or was cancelled).
    #[error("task failed: {message}")]
    Task { message: String },
}

/// Why a fetch failed. Closed set: callers branch on the kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// No connection could be established.
    #[error("could not connect to {url}")]
    ConnectionFailure { url: String },

    /// Anything else: HTTP error status, body read failure, client setup.
    #[error("{url}: {message}")]
    Other { url: String, message: String },
}

impl FetchError {
    /// The address the failed request was made to.
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } | Self::ConnectionFailure { url } | Self::Other { url, .. } => {
                url
            }
        }
    }
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DistillError>;

impl DistillError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a task failure from any displayable message.
    pub fn task(msg: impl Into<String>) -> Self {
        Self::Task {
            message: msg.into(),
        }
    }

    /// Create a path mapping error for `address`.
    pub fn path_mapping(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PathMapping {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
