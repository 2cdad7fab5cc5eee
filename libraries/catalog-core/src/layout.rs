//! Addressing rules for the built tree
//!
//! The builder writes files where these functions say they live and the server
//! looks them up the same way, so both sides share this module.

use std::path::Path;

/// File name of every index document (library, artist and release tiers)
pub const INDEX_FILE: &str = "index.json";

/// Request segment the server always rejects
pub const FAVICON: &str = "favicon.ico";

/// Extensions served as image artifacts
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Relative path of a track's served artifact: `<release dir>/<stem>.<extension>`
pub fn served_track_path(release_directory: &str, stem: &str, extension: &str) -> String {
    format!("{}/{}.{}", release_directory, stem, extension)
}

/// Extension of a file name, if it has one
pub fn extension_of(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(|ext| ext.to_str())
}

/// Whether a file name carries exactly the given extension
pub fn has_extension(name: &str, extension: &str) -> bool {
    extension_of(name) == Some(extension)
}

/// Whether a file name looks like an image artifact
pub fn is_image(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|image| image.eq_ignore_ascii_case(ext))
    })
}

/// A single, normal path component: no separators, not `.` or `..`
pub fn is_single_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Name of a release directory below its artist directory
///
/// Returns `None` unless `release_directory` is exactly `<artist_directory>/<name>`.
pub fn release_name<'a>(artist_directory: &str, release_directory: &'a str) -> Option<&'a str> {
    release_directory
        .strip_prefix(artist_directory)?
        .strip_prefix('/')
        .filter(|name| is_single_component(name))
}
