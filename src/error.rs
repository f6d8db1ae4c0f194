//! Unified error types for chatsort.
//!
//! This module provides a single [`SortError`] enum that covers every failure
//! the library can propagate. Parsing and grouping cannot fail: a line that
//! does not match the transcript grammar is classified, never rejected. The
//! only propagated failures live at the I/O boundary.
//!
//! # Error Handling Philosophy
//!
//! - **Missing inputs** abort the run before any state is mutated
//! - **Stale sources** during placement are reported and skipped by the caller
//! - **No new data** is not an error at all, see [`crate::pipeline::RunOutcome`]

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatsort operations.
///
/// # Example
///
/// ```rust
/// use chatsort::error::Result;
/// use chatsort::grouping::TopicGroup;
///
/// fn my_function() -> Result<Vec<TopicGroup>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, SortError>;

/// The error type for all chatsort operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SortError {
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A required input (chat log, source directory, bundle) is absent.
    ///
    /// Raised before any state is written, so a rerun is always safe.
    #[error("Missing {what}: {}", path.display())]
    MissingInput {
        /// What was expected at the path (e.g. "chat log")
        what: &'static str,
        /// The path that was checked
        path: PathBuf,
    },

    /// An attachment source vanished before it could be moved.
    ///
    /// Usually left over from a previous partially-completed run.
    #[error("Source file no longer exists: {}", path.display())]
    StaleSource {
        /// The missing source path
        path: PathBuf,
    },

    /// The persisted resume state could not be read or written as JSON.
    #[error("Invalid resume state in {}: {source}", path.display())]
    State {
        /// The state file path
        path: PathBuf,
        /// The underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file is malformed.
    #[error("Invalid config{}: {message}", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    Config {
        /// The config file, if one was read
        path: Option<PathBuf>,
        /// Description of what's wrong
        message: String,
    },

    /// A glob pattern for bundle discovery is invalid.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as configured
        pattern: String,
        /// The underlying glob error
        #[source]
        source: glob::PatternError,
    },

    /// Zip archive error while extracting a bundle.
    #[cfg(feature = "archive")]
    #[error("Archive error in {}: {source}", path.display())]
    Archive {
        /// The bundle being extracted
        path: PathBuf,
        /// The underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// An external command (transcoder, transcriber) failed.
    #[error("{program} failed: {message}")]
    Command {
        /// The program that was invoked
        program: String,
        /// Exit status or stderr excerpt
        message: String,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl SortError {
    /// Creates a missing input error.
    pub fn missing(what: &'static str, path: impl Into<PathBuf>) -> Self {
        SortError::MissingInput {
            what,
            path: path.into(),
        }
    }

    /// Creates a stale source error.
    pub fn stale(path: impl Into<PathBuf>) -> Self {
        SortError::StaleSource { path: path.into() }
    }

    /// Creates a resume state error.
    pub fn state(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        SortError::State {
            path: path.into(),
            source,
        }
    }

    /// Creates a config error.
    pub fn config(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        SortError::Config {
            path,
            message: message.into(),
        }
    }

    /// Creates an external command error.
    pub fn command(program: impl Into<String>, message: impl Into<String>) -> Self {
        SortError::Command {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, SortError::Io(_))
    }

    /// Returns `true` if a required input was missing.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, SortError::MissingInput { .. })
    }

    /// Returns `true` if an attachment source had already been consumed.
    pub fn is_stale_source(&self) -> bool {
        matches!(self, SortError::StaleSource { .. })
    }

    /// Returns `true` if the resume state could not be (de)serialized.
    pub fn is_state(&self) -> bool {
        matches!(self, SortError::State { .. })
    }
}
