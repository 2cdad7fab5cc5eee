/// Metadata-specific errors
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Tag parsing error
    #[error("Tag parsing error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
}

impl MetadataError {
    /// Path of the file the error is about
    pub fn path(&self) -> &PathBuf {
        match self {
            MetadataError::FileNotFound(path) | MetadataError::Parse { path, .. } => path,
        }
    }
}

impl From<MetadataError> for catalog_core::CatalogError {
    fn from(err: MetadataError) -> Self {
        let reason = match &err {
            MetadataError::FileNotFound(_) => "file not found".to_string(),
            MetadataError::Parse { source, .. } => source.to_string(),
        };
        catalog_core::CatalogError::unreadable_metadata(err.path().clone(), reason)
    }
}
