/// Application configuration
use crate::error::{Result, ServerError};
use catalog_builder::{BuildOptions, ConcurrencyLimits, TranscodeSettings};
use catalog_core::TranscodeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file read when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Relative to `root`
    #[serde(default = "default_descriptor")]
    pub descriptor: PathBuf,

    /// Relative to `root`
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildSettings {
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    #[serde(default = "default_workers")]
    pub workers: usize,

    /// 0 starts every artist at once
    #[serde(default)]
    pub artist_concurrency: usize,

    #[serde(default = "default_one")]
    pub release_concurrency: usize,

    #[serde(default = "default_one")]
    pub track_concurrency: usize,

    /// 0 disables the timeout
    #[serde(default = "default_extract_timeout_secs")]
    pub extract_timeout_secs: u64,

    #[serde(default)]
    pub transcode: TranscodeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    #[serde(default = "default_codec")]
    pub codec: String,

    #[serde(default = "default_bitrate")]
    pub bitrate: String,

    #[serde(default = "default_target_extension")]
    pub extension: String,

    #[serde(default = "default_enabled")]
    pub preserve_tags: bool,

    /// 0 disables the timeout
    #[serde(default = "default_transcode_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from `path`, or from `catalog.toml` when present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let config = config::Config::builder()
            .add_source(source)
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.build.source_extension.is_empty() {
            return Err(ServerError::Config(
                "build.source_extension must not be empty".to_string(),
            ));
        }

        if self.build.workers == 0 {
            return Err(ServerError::Config(
                "build.workers must be at least 1".to_string(),
            ));
        }

        if self.build.transcode.enabled
            && self.build.transcode.extension == self.build.source_extension
        {
            return Err(ServerError::Config(format!(
                "build.transcode.extension {:?} must differ from build.source_extension",
                self.build.transcode.extension
            )));
        }

        if self.server.host.parse::<std::net::IpAddr>().is_err() {
            return Err(ServerError::Config(format!(
                "server.host {:?} is not an IP address",
                self.server.host
            )));
        }

        Ok(())
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.library.root.join(&self.library.descriptor)
    }

    pub fn output_path(&self) -> PathBuf {
        self.library.root.join(&self.library.output)
    }

    /// Extension of the audio artifacts in the built tree
    pub fn served_extension(&self) -> &str {
        if self.build.transcode.enabled {
            &self.build.transcode.extension
        } else {
            &self.build.source_extension
        }
    }

    /// Options for one build of the configured library
    pub fn build_options(&self, dry_run: bool) -> BuildOptions {
        let build = &self.build;

        let transcode = build.transcode.enabled.then(|| TranscodeSettings {
            extension: build.transcode.extension.clone(),
            options: TranscodeOptions {
                codec: build.transcode.codec.clone(),
                bitrate: build.transcode.bitrate.clone(),
                preserve_tags: build.transcode.preserve_tags,
            },
            timeout: seconds(build.transcode.timeout_secs),
        });

        let limits = ConcurrencyLimits {
            artists: (build.artist_concurrency > 0).then_some(build.artist_concurrency),
            releases: build.release_concurrency,
            tracks: build.track_concurrency,
        };

        let mut options = BuildOptions::new(&self.library.root)
            .descriptor_path(self.descriptor_path())
            .output_root(self.output_path())
            .dry_run(dry_run)
            .transcode(transcode)
            .limits(limits)
            .workers(build.workers)
            .extract_timeout(seconds(build.extract_timeout_secs));
        options.source_extension = build.source_extension.clone();
        options
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// Default values
fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_descriptor() -> PathBuf {
    PathBuf::from(catalog_core::layout::INDEX_FILE)
}

fn default_output() -> PathBuf {
    PathBuf::from("build")
}

fn default_source_extension() -> String {
    catalog_builder::options::DEFAULT_SOURCE_EXTENSION.to_string()
}

fn default_workers() -> usize {
    2
}

fn default_one() -> usize {
    1
}

fn default_extract_timeout_secs() -> u64 {
    30
}

fn default_enabled() -> bool {
    true
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_codec() -> String {
    "aac".to_string()
}

fn default_bitrate() -> String {
    "256k".to_string()
}

fn default_target_extension() -> String {
    catalog_builder::options::DEFAULT_TARGET_EXTENSION.to_string()
}

fn default_transcode_timeout_secs() -> u64 {
    600
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: default_root(),
            descriptor: default_descriptor(),
            output: default_output(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            workers: default_workers(),
            artist_concurrency: 0,
            release_concurrency: default_one(),
            track_concurrency: default_one(),
            extract_timeout_secs: default_extract_timeout_secs(),
            transcode: TranscodeConfig::default(),
        }
    }
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ffmpeg_path: default_ffmpeg_path(),
            codec: default_codec(),
            bitrate: default_bitrate(),
            extension: default_target_extension(),
            preserve_tags: default_enabled(),
            timeout_secs: default_transcode_timeout_secs(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
