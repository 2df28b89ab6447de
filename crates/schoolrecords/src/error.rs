//! Error types for schoolrecords.
//!
//! This module defines all error types used throughout the schoolrecords crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for schoolrecords operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// A collection file exists but could not be parsed.
    #[error("failed to parse collection file {path}: {source}")]
    CollectionLoad {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A collection file could not be written.
    #[error("failed to write {path}: {source}")]
    CollectionWrite {
        /// Path that was being written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No record with the given ID exists.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of record ("student", "teacher", "mark").
        kind: &'static str,
        /// The ID that was looked up.
        id: String,
    },

    /// Two records in one collection share an ID.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId {
        /// Kind of record.
        kind: &'static str,
        /// The repeated ID.
        id: String,
    },

    /// The next sequential ID would overflow.
    #[error("no {kind} ids left: the sequence is at its limit")]
    IdsExhausted {
        /// Kind of record.
        kind: &'static str,
    },

    // === Input Errors ===
    /// A record field failed its check.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// A file-save path escapes the data directory or is otherwise unusable.
    #[error("refusing to write outside the data directory: {path}")]
    PathOutsideRoot {
        /// The requested relative path.
        path: String,
    },

    /// An import bundle has an unknown format marker.
    #[error("unsupported bundle format: {format}")]
    UnsupportedBundle {
        /// The format string found in the bundle.
        format: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Server Errors ===
    /// The HTTP server failed to bind or run.
    #[error("server error: {0}")]
    Server(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for schoolrecords operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error for a field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a new server error.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means a record was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error was caused by bad caller input rather than the
    /// environment.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::DuplicateId { .. }
                | Self::IdsExhausted { .. }
                | Self::PathOutsideRoot { .. }
                | Self::UnsupportedBundle { .. }
        )
    }

    /// Short machine-readable code used in API error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::CollectionLoad { .. } => "collection_load",
            Self::CollectionWrite { .. } => "collection_write",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::IdsExhausted { .. } => "ids_exhausted",
            Self::Validation { .. } => "validation",
            Self::PathOutsideRoot { .. } => "path_outside_root",
            Self::UnsupportedBundle { .. } => "unsupported_bundle",
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => "config",
            Self::Server(_) => "server",
            Self::Io(_) | Self::DirectoryCreate { .. } => "io",
            Self::Json(_) => "json",
            Self::Internal(_) => "internal",
        }
    }
}
