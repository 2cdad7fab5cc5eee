//! Catalog Builder
//!
//! Turns a library descriptor into a self-contained served tree.
//!
//! # Features
//!
//! - Copies every artist's source directory into a staged output tree
//! - Extracts per-track metadata through a `MetadataExtractor`
//! - Transcodes source audio into a streaming format through a `Transcoder` (FFmpeg)
//! - Writes library, artist and release indexes mirroring the directory hierarchy
//! - Publishes the staged tree atomically, only when every step succeeded
//! - Dry-run mode: every read, derivation and log line, no filesystem writes
//!
//! # Architecture
//!
//! - `orchestrator`: the build pipeline and its concurrency shape
//! - `workers`: bounded pool with timeouts and cancellation for blocking/external work
//! - `staging`: staged output and atomic publish
//! - `transcoder`: FFmpeg-backed `Transcoder`
//! - `assets`: copying, enumeration, and index document writes
//! - `readme`: README table of contents generator

pub mod assets;
pub mod options;
pub mod orchestrator;
pub mod readme;
pub mod staging;
pub mod transcoder;
pub mod workers;

pub use catalog_core::CatalogError as BuildError;
pub use options::{BuildOptions, ConcurrencyLimits, TranscodeSettings};
pub use orchestrator::{BuildReport, Orchestrator};
pub use readme::ReadmeGenerator;
pub use transcoder::FfmpegTranscoder;
pub use workers::WorkerPool;
