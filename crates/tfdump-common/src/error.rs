//! Unified error types for the tfdump workspace.
//!
//! Every crate returns [`TfdumpError`]. Callers that need to say *which*
//! resource, reference, or pattern failed wrap the underlying error with
//! [`TfdumpError::context`] instead of flattening it into a string, so the
//! original variant stays inspectable.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum TfdumpError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A required configuration value is missing or invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A named object was not found in the object store.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of the missing object.
        kind: &'static str,
        /// Identifier of the missing object (`namespace/name`).
        id: String,
    },

    /// The object store refused the read.
    #[error("access denied reading {kind} {id}")]
    AccessDenied {
        /// Kind of the object.
        kind: &'static str,
        /// Identifier of the object (`namespace/name`).
        id: String,
    },

    /// A key/value reference named a kind other than `ConfigMap` or `Secret`.
    #[error("unsupported source kind {kind:?}, expected \"ConfigMap\" or \"Secret\"")]
    UnsupportedKind {
        /// The rejected kind string.
        kind: String,
    },

    /// A rename directive is malformed.
    #[error("invalid rename pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Which rule the pattern broke.
        reason: &'static str,
    },

    /// An artifact URL (or the host override applied to it) could not be parsed.
    #[error("invalid artifact URL {url}: {message}")]
    InvalidUrl {
        /// URL as given.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The artifact host could not be reached.
    #[error("failed to download artifact from {url}: {message}")]
    Unreachable {
        /// Artifact URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The artifact server answered with a non-success status.
    #[error("failed to download artifact from {url}, status: {status}")]
    BadStatus {
        /// Artifact URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The downloaded artifact size disagrees with the declared size.
    #[error("artifact {url}: expected size {expected}, got {actual}")]
    SizeMismatch {
        /// Artifact URL.
        url: String,
        /// Declared size in bytes.
        expected: u64,
        /// Received size in bytes.
        actual: u64,
    },

    /// The artifact archive is malformed.
    #[error("failed to extract artifact: {message}")]
    Extraction {
        /// Description of the extraction failure.
        message: String,
    },

    /// The execution engine reported a failure.
    #[error("terraform {command} failed: {message}")]
    Engine {
        /// Engine subcommand that failed.
        command: String,
        /// Engine output describing the failure.
        message: String,
    },

    /// The run was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A YAML manifest could not be parsed.
    #[error("invalid manifest: {source}")]
    Manifest {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },

    /// An error annotated with the resource, reference, or pattern it concerns.
    #[error("{context}: {source}")]
    Context {
        /// What was being processed.
        context: String,
        /// Underlying error.
        source: Box<TfdumpError>,
    },
}

impl TfdumpError {
    /// Wraps this error with a description of what was being processed.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through context wrappers.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns whether the underlying failure is a missing object.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, TfdumpError>;

/// Extension trait for attaching context to results.
pub trait ResultExt<T> {
    /// Wraps the error, if any, with a lazily built context message.
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped in [`TfdumpError::Context`].
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}
