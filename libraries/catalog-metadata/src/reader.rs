/// Metadata extractor implementation using lofty
use crate::error::MetadataError;
use catalog_core::{MetadataExtractor, TrackTags};
use lofty::{Accessor, ItemKey, Probe, Tag, TaggedFileExt};
use std::path::Path;

/// Metadata extractor using the lofty library
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyMetadataExtractor;

impl LoftyMetadataExtractor {
    /// Create a new metadata extractor
    pub fn new() -> Self {
        Self
    }

    /// Read tags, keeping the crate-level error type
    pub fn read(&self, path: &Path) -> crate::Result<TrackTags> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.to_path_buf()));
        }

        let parse = |source| MetadataError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let tagged_file = Probe::open(path).map_err(parse)?.read().map_err(parse)?;

        // Prefer the format's primary tag (ID3v2 for MP3, Vorbis comments for FLAC/OGG)
        let tags = tagged_file
            .primary_tag()
            .or(tagged_file.first_tag())
            .map(Self::extract_from_tag)
            .unwrap_or_default();

        tracing::debug!(path = %path.display(), title = ?tags.title, "Read track tags");
        Ok(tags)
    }

    /// Extract the indexed fields from a lofty tag
    fn extract_from_tag(tag: &Tag) -> TrackTags {
        let date = tag
            .get_string(&ItemKey::RecordingDate)
            .map(|s| s.to_string())
            .or_else(|| tag.year().map(|year| year.to_string()));

        TrackTags {
            title: tag.title().map(|s| s.to_string()),
            artist: tag.artist().map(|s| s.to_string()),
            date,
            album: tag.album().map(|s| s.to_string()),
            track_no: tag.track(),
        }
    }
}

impl MetadataExtractor for LoftyMetadataExtractor {
    fn extract(&self, path: &Path) -> catalog_core::Result<TrackTags> {
        self.read(path).map_err(Into::into)
    }
}
