//! Typed error handling for prunedecl.
//!
//! Only two classes of problem ever escape the engine: selection-range errors
//! (the requested instance does not exist) and internal rewrite errors. Span
//! resolution problems are absorbed by the candidate layer. The remaining
//! variants cover the plumbing around it (reading dumps, config, output).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for prunedecl operations.
#[derive(Error, Debug)]
pub enum PruneError {
    /// I/O error when reading a tree dump, a source file or writing output
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The program tree dump is malformed
    #[error("Malformed program tree in {path}: {message}")]
    TreeFormat { path: PathBuf, message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A protected-file pattern failed to compile
    #[error("Invalid protected-file pattern: {message}")]
    Pattern { message: String },

    /// Instance ordinals are 1-based
    #[error("Invalid instance counter {counter}: counters start at 1")]
    InvalidCounter { counter: usize },

    /// The upper bound of a range is below its lower bound
    #[error("Invalid instance range: to-counter {to} is smaller than counter {from}")]
    InvalidRange { from: usize, to: usize },

    /// The requested instance exceeds the number of valid candidates
    #[error("No modification: requested instance {requested}, only {available} available")]
    MaxInstance { requested: usize, available: usize },

    /// The upper bound of a range exceeds the number of valid candidates
    #[error("To-counter {to} is too big: only {available} instances available")]
    ToCounterTooBig { to: usize, available: usize },

    /// The underlying rewrite failed part-way through an attempt
    #[error("Internal rewrite error: {message}")]
    Internal { message: String },
}

impl PruneError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a tree format error.
    pub fn tree_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::TreeFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal rewrite error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Selection-range errors: nothing was mutated, the caller may re-query and retry.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCounter { .. }
                | Self::InvalidRange { .. }
                | Self::MaxInstance { .. }
                | Self::ToCounterTooBig { .. }
        )
    }

    /// Check if this is a recoverable error (the same input can be retried).
    pub fn is_recoverable(&self) -> bool {
        self.is_selection_error() || matches!(self, Self::Config { .. })
    }

    /// Process exit code used by the driver.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MaxInstance { .. } | Self::ToCounterTooBig { .. } => 1,
            Self::InvalidCounter { .. } | Self::InvalidRange { .. } => 2,
            Self::Internal { .. } => 3,
            Self::Io { .. } | Self::TreeFormat { .. } | Self::Config { .. } | Self::Pattern { .. } => 4,
        }
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::TreeFormat { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<regex::Error> for PruneError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern {
            message: err.to_string(),
        }
    }
}

/// Convenience type alias for prunedecl results.
pub type PruneResult<T> = Result<T, PruneError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> PruneResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> PruneResult<T> {
        self.map_err(|e| PruneError::io(path, e))
    }
}
