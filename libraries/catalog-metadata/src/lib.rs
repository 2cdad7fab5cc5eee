//! Catalog Metadata
//!
//! Tag extraction for the catalog build.
//!
//! This crate provides `LoftyMetadataExtractor`, the `MetadataExtractor` used by the
//! build pipeline. It reads title, artist, album, date and track number from the
//! primary tag of a file (MP3, FLAC, OGG, WAV, AAC/M4A, OPUS).
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_core::MetadataExtractor;
//! use catalog_metadata::LoftyMetadataExtractor;
//! use std::path::Path;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = LoftyMetadataExtractor::new();
//! let tags = extractor.extract(Path::new("/music/song.flac"))?;
//! println!("{:?}", tags.title);
//! # Ok(())
//! # }
//! ```

mod error;
mod reader;

pub use error::{MetadataError, Result};
pub use reader::LoftyMetadataExtractor;
