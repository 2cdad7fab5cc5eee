/// Core error types for the catalog
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using `CatalogError`
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Which declared source directory was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Artist,
    Release,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Artist => f.write_str("artist"),
            AssetKind::Release => f.write_str("release"),
        }
    }
}

/// Core error type for the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Descriptor file absent
    #[error("Library descriptor not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    /// Descriptor present but malformed or inconsistent
    #[error("Invalid library descriptor: {0}")]
    ConfigInvalid(String),

    /// Declared source directory absent at build time
    #[error("{kind} directory not found for {name}: {}", path.display())]
    AssetMissing {
        kind: AssetKind,
        name: String,
        path: PathBuf,
    },

    /// A source file name that cannot appear in an index path
    #[error("File name is not valid UTF-8: {}", .0.display())]
    InvalidFileName(PathBuf),

    /// Tag extraction failed
    #[error("Unreadable metadata in {}: {reason}", path.display())]
    UnreadableMetadata { path: PathBuf, reason: String },

    /// External encode step failed
    #[error("Transcoding {} failed: {diagnostics}", path.display())]
    TranscodeError { path: PathBuf, diagnostics: String },

    /// A pooled operation exceeded its time limit
    #[error("{operation} timed out after {after:?}: {}", path.display())]
    Timeout {
        operation: &'static str,
        path: PathBuf,
        after: Duration,
    },

    /// The build was cancelled
    #[error("Build cancelled")]
    Cancelled,

    /// A blocking worker panicked or was aborted
    #[error("Worker failure: {0}")]
    Worker(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    /// Create an invalid descriptor error
    pub fn config_invalid(msg: impl Into<String>) -> Self {
        Self::ConfigInvalid(msg.into())
    }

    /// Create a missing asset error
    pub fn asset_missing(kind: AssetKind, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::AssetMissing {
            kind,
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create an unreadable metadata error
    pub fn unreadable_metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnreadableMetadata {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a transcode error carrying the tool's diagnostics
    pub fn transcode(path: impl Into<PathBuf>, diagnostics: impl Into<String>) -> Self {
        Self::TranscodeError {
            path: path.into(),
            diagnostics: diagnostics.into(),
        }
    }
}
