/// Collaborator traits for the build pipeline
use crate::error::Result;
use crate::index::TrackTags;
use async_trait::async_trait;
use std::path::Path;

/// Metadata extractor trait
///
/// Implementers read the embedded tags of one audio file. Extraction is a blocking,
/// side-effect free read; the orchestrator runs it on its worker pool.
pub trait MetadataExtractor: Send + Sync {
    /// Read the tags of the file at `path`
    ///
    /// # Errors
    /// Returns `CatalogError::UnreadableMetadata` if the file cannot be parsed
    fn extract(&self, path: &Path) -> Result<TrackTags>;
}

/// Encoder settings applied to every transcoded artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeOptions {
    /// Target audio codec, e.g. `aac`
    pub codec: String,
    /// Target bitrate, e.g. `256k`
    pub bitrate: String,
    /// Copy the source tags into the output container
    pub preserve_tags: bool,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            codec: "aac".to_string(),
            bitrate: "256k".to_string(),
            preserve_tags: true,
        }
    }
}

/// Asset transcoder trait
///
/// Implementers write exactly one file at `dest`. The source file is left in place;
/// removing it is the caller's job.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Re-encode `source` into `dest`
    ///
    /// # Errors
    /// Returns `CatalogError::TranscodeError` with the tool's diagnostics on failure
    async fn transcode(&self, source: &Path, dest: &Path, options: &TranscodeOptions)
        -> Result<()>;
}
