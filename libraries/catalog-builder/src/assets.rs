//! File system helpers for the build: copying, enumeration, document writes

use catalog_core::{index, AssetKind, CatalogError, Result};
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

/// Fail with `AssetMissing` unless `path` is an existing directory
pub async fn ensure_directory(path: &Path, kind: AssetKind, name: &str) -> Result<()> {
    let is_dir = tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false);

    if is_dir {
        Ok(())
    } else {
        Err(CatalogError::asset_missing(kind, name, path))
    }
}

/// Recursively copy `source` into `target`, returning the number of files copied
///
/// Checks `cancel` between entries so an aborted build stops writing promptly.
pub fn copy_tree(source: &Path, target: &Path, cancel: &CancellationToken) -> Result<u64> {
    let mut copied = 0;

    for entry in WalkDir::new(source) {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| CatalogError::Worker(e.to_string()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &destination)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Files directly inside `directory` carrying `extension`, in directory enumeration order
///
/// Fails with `InvalidFileName` for a matching file whose name is not UTF-8.
pub fn enumerate_sources(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        if path.extension() != Some(OsStr::new(extension)) {
            continue;
        }
        // Track paths in the release index are strings; the name must survive as-is
        if path.file_name().and_then(OsStr::to_str).is_none() {
            return Err(CatalogError::InvalidFileName(path));
        }
        sources.push(path);
    }

    Ok(sources)
}

/// Write an index document, creating parent directories as needed
pub async fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let document = index::to_document(value)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, document).await?;
    Ok(())
}
