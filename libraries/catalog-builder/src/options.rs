//! Build options passed explicitly into the orchestrator

use catalog_core::{CatalogError, Result, TranscodeOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default source audio extension
pub const DEFAULT_SOURCE_EXTENSION: &str = "flac";

/// Default extension of transcoded artifacts
pub const DEFAULT_TARGET_EXTENSION: &str = "m4a";

/// Concurrency limits per level of the library hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimits {
    /// Artists built at once; `None` starts every artist immediately
    pub artists: Option<usize>,
    /// Releases built at once within one artist
    pub releases: usize,
    /// Tracks processed at once within one release
    pub tracks: usize,
}

impl Default for ConcurrencyLimits {
    fn default() -> Self {
        // Parallel across artists, serial within an artist: the transcoder is CPU-bound
        Self {
            artists: None,
            releases: 1,
            tracks: 1,
        }
    }
}

impl ConcurrencyLimits {
    pub(crate) fn artist_width(&self, artist_count: usize) -> usize {
        self.artists.unwrap_or(artist_count).max(1)
    }

    pub(crate) fn release_width(&self) -> usize {
        self.releases.max(1)
    }

    pub(crate) fn track_width(&self) -> usize {
        self.tracks.max(1)
    }
}

/// How source audio is re-encoded for streaming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSettings {
    /// Extension of the produced artifact
    pub extension: String,
    pub options: TranscodeOptions,
    /// Upper bound for one transcoder invocation
    pub timeout: Option<Duration>,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            extension: DEFAULT_TARGET_EXTENSION.to_string(),
            options: TranscodeOptions::default(),
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

/// Everything a build needs besides the descriptor itself
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory the descriptor's relative paths are resolved against
    pub source_root: PathBuf,
    /// Descriptor file, copied verbatim as the library index
    pub descriptor_path: PathBuf,
    /// Where the built tree is published
    pub output_root: PathBuf,
    /// Read, derive and log without touching the filesystem
    pub dry_run: bool,
    /// Extension of recognized source audio files
    pub source_extension: String,
    /// `None` publishes source audio as-is
    pub transcode: Option<TranscodeSettings>,
    pub limits: ConcurrencyLimits,
    /// Size of the worker pool for blocking work and transcoder processes
    pub workers: usize,
    /// Upper bound for one metadata extraction
    pub extract_timeout: Option<Duration>,
}

impl BuildOptions {
    /// Options for a library rooted at `source_root`, using `index.json` and `build/` there
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        let source_root = source_root.into();
        Self {
            descriptor_path: source_root.join(catalog_core::layout::INDEX_FILE),
            output_root: source_root.join("build"),
            source_root,
            dry_run: false,
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            transcode: Some(TranscodeSettings::default()),
            limits: ConcurrencyLimits::default(),
            workers: 2,
            extract_timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Set the descriptor file
    pub fn descriptor_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.descriptor_path = path.into();
        self
    }

    /// Set the output root
    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_root = path.into();
        self
    }

    /// Enable or disable dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set or clear the transcode step
    pub fn transcode(mut self, settings: Option<TranscodeSettings>) -> Self {
        self.transcode = settings;
        self
    }

    /// Set the per-level concurrency limits
    pub fn limits(mut self, limits: ConcurrencyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the worker pool size
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the metadata extraction timeout
    pub fn extract_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.extract_timeout = timeout;
        self
    }

    /// Extension of the artifacts track paths point at
    pub fn served_extension(&self) -> &str {
        self.transcode
            .as_ref()
            .map_or(self.source_extension.as_str(), |settings| {
                settings.extension.as_str()
            })
    }

    /// Reject option combinations that would corrupt the built tree
    pub fn validate(&self) -> Result<()> {
        if self.source_extension.is_empty() {
            return Err(CatalogError::config_invalid("source extension is empty"));
        }
        if let Some(settings) = &self.transcode {
            if settings.extension.is_empty() || settings.extension == self.source_extension {
                return Err(CatalogError::config_invalid(format!(
                    "transcode extension {:?} must differ from the source extension {:?}",
                    settings.extension, self.source_extension
                )));
            }
        }
        if self.workers == 0 {
            return Err(CatalogError::config_invalid("worker pool size must be at least 1"));
        }
        if same_location(&self.output_root, &self.source_root) {
            return Err(CatalogError::config_invalid(
                "output root must differ from the library root",
            ));
        }
        Ok(())
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_library_layout() {
        let options = BuildOptions::new("/srv/library");
        assert_eq!(options.descriptor_path, PathBuf::from("/srv/library/index.json"));
        assert_eq!(options.output_root, PathBuf::from("/srv/library/build"));
        assert_eq!(options.served_extension(), "m4a");
        assert_eq!(options.limits.artists, None);
        assert_eq!(options.limits.releases, 1);
    }

    #[test]
    fn served_extension_falls_back_to_source_without_transcoding() {
        let options = BuildOptions::new("/srv/library").transcode(None);
        assert_eq!(options.served_extension(), "flac");
    }

    #[test]
    fn transcoding_to_the_source_extension_is_rejected() {
        let settings = TranscodeSettings {
            extension: "flac".to_string(),
            ..TranscodeSettings::default()
        };
        let options = BuildOptions::new("/srv/library").transcode(Some(settings));
        assert!(options.validate().is_err());
    }

    #[test]
    fn unbounded_artist_width_covers_every_artist() {
        let limits = ConcurrencyLimits::default();
        assert_eq!(limits.artist_width(7), 7);
        assert_eq!(limits.artist_width(0), 1);
    }
}
