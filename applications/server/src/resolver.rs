//! Request path resolution against the built tree
//!
//! A request path addresses at most three levels: `/<artist>/<release>/<file>`. Each level
//! is checked against the directories on disk, and a track requested without its extension
//! resolves to the track's record in the release index instead of the audio bytes.

use crate::error::Result;
use crate::services::tree::{is_dir, is_file, BuiltTree};
use catalog_core::layout::{self, FAVICON, INDEX_FILE};
use catalog_core::Track;
use std::path::PathBuf;

/// What a request path refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    /// Binary file streamed as-is (image or audio)
    Artifact(PathBuf),
    /// JSON index served verbatim
    Document(PathBuf),
    /// A single track record from a release index
    Track(Track),
}

/// Split a request path into its non-empty segments
///
/// Returns `None` for paths deeper than three levels or with segments that could
/// leave the addressed directory.
pub fn segments(request_path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = request_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() > 3 || !segments.iter().all(|s| layout::is_single_component(s)) {
        return None;
    }
    Some(segments)
}

/// Resolve `request_path` against `tree`
pub async fn resolve(tree: &BuiltTree, request_path: &str) -> Result<Resolution> {
    let Some(segments) = segments(request_path) else {
        return Ok(Resolution::NotFound);
    };

    match segments.as_slice() {
        [] => Ok(Resolution::NotFound),
        [first, ..] if *first == FAVICON => Ok(Resolution::NotFound),
        [artist] => resolve_artist(tree, artist).await,
        [artist, release] => resolve_release(tree, artist, release).await,
        [artist, release, file] => resolve_file(tree, artist, release, file).await,
        _ => Ok(Resolution::NotFound),
    }
}

async fn resolve_artist(tree: &BuiltTree, artist: &str) -> Result<Resolution> {
    let directory = tree.path_of(&[artist]);
    if !is_dir(&directory).await {
        return Ok(Resolution::NotFound);
    }
    document(directory.join(INDEX_FILE)).await
}

async fn resolve_release(tree: &BuiltTree, artist: &str, release: &str) -> Result<Resolution> {
    if !is_dir(&tree.path_of(&[artist])).await {
        return Ok(Resolution::NotFound);
    }

    // Images may sit directly in the artist directory (e.g. the avatar)
    let path = tree.path_of(&[artist, release]);
    if layout::is_image(release) && is_file(&path).await {
        return artifact(tree, path);
    }

    if !is_dir(&path).await {
        return Ok(Resolution::NotFound);
    }
    document(path.join(INDEX_FILE)).await
}

async fn resolve_file(
    tree: &BuiltTree,
    artist: &str,
    release: &str,
    file: &str,
) -> Result<Resolution> {
    if !is_dir(&tree.path_of(&[artist])).await {
        return Ok(Resolution::NotFound);
    }

    let directory = tree.path_of(&[artist, release]);
    if !is_dir(&directory).await {
        return Ok(Resolution::NotFound);
    }

    let extension = tree.served_extension();
    let path = directory.join(file);
    if (layout::is_image(file) || layout::has_extension(file, extension)) && is_file(&path).await {
        return artifact(tree, path);
    }

    // `<file>.<served extension>` exists: the request is for the track's metadata
    let artifact_name = format!("{}.{}", file, extension);
    if !is_file(&directory.join(&artifact_name)).await {
        return Ok(Resolution::NotFound);
    }

    let Some(index) = tree.release_index(&directory).await? else {
        return Ok(Resolution::NotFound);
    };
    let track_path = layout::served_track_path(&index.directory, file, extension);
    Ok(index
        .find_track(&track_path)
        .cloned()
        .map_or(Resolution::NotFound, Resolution::Track))
}

fn artifact(tree: &BuiltTree, path: PathBuf) -> Result<Resolution> {
    tree.validate_path(&path)?;
    Ok(Resolution::Artifact(path))
}

async fn document(path: PathBuf) -> Result<Resolution> {
    if is_file(&path).await {
        Ok(Resolution::Document(path))
    } else {
        Ok(Resolution::NotFound)
    }
}
