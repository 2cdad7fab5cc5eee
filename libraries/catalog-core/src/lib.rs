//! Catalog Core
//!
//! Platform-agnostic types, traits, and error handling shared by the catalog builder
//! and the catalog server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Descriptor Types**: `LibraryDescriptor`, `Artist`, `Release` (the build input)
//! - **Index Types**: `ArtistIndex`, `ReleaseIndex`, `Track` (the build output)
//! - **Layout**: the addressing rules both the builder and the server rely on
//! - **Collaborator Traits**: `MetadataExtractor`, `Transcoder`
//! - **Error Handling**: Unified `CatalogError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use catalog_core::{layout, Release, Track, TrackTags};
//!
//! let release = Release {
//!     title: "Debut".to_string(),
//!     kind: "album".to_string(),
//!     cover: "artist/debut/cover.jpg".to_string(),
//!     date: "2024-01-01".to_string(),
//!     directory: "artist/debut".to_string(),
//! };
//!
//! let path = layout::served_track_path(&release.directory, "01 - Intro", "m4a");
//! let track = Track::new(TrackTags::default(), path);
//! assert_eq!(track.path, "artist/debut/01 - Intro.m4a");
//! ```

#![forbid(unsafe_code)]

pub mod descriptor;
pub mod error;
pub mod index;
pub mod layout;
pub mod traits;

// Re-export commonly used types
pub use descriptor::{Artist, LibraryDescriptor, Release};
pub use error::{AssetKind, CatalogError, Result};
pub use index::{ArtistIndex, ReleaseIndex, Track, TrackTags};
pub use traits::{MetadataExtractor, TranscodeOptions, Transcoder};
