//! Staged output with atomic publish
//!
//! A build writes into a hidden sibling of the output root. Only when every artist
//! succeeded is the staged tree renamed over the output root, so readers never see a
//! half-written tree and a failed build leaves the previous one untouched.

use catalog_core::{CatalogError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use uuid::Uuid;

/// A staging directory next to the output root
#[derive(Debug)]
pub struct Staging {
    output: PathBuf,
    root: PathBuf,
}

impl Staging {
    /// Create a fresh staging directory, cleaning up after interrupted builds
    ///
    /// A publish interrupted between its two renames leaves no output root and the
    /// previous tree under a retired name; that tree is restored first.
    pub async fn prepare(output: &Path) -> Result<Self> {
        let (parent, name) = split_output(output)?;
        fs::create_dir_all(&parent).await?;
        recover_leftovers(&parent, &name, output).await?;

        let root = parent.join(format!(".{}.staging-{}", name, Uuid::new_v4().simple()));
        fs::create_dir(&root).await?;
        tracing::debug!(staging = %root.display(), "Prepared staging directory");

        Ok(Self {
            output: output.to_path_buf(),
            root,
        })
    }

    /// Directory the build writes into
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replace the output root with the staged tree
    pub async fn publish(self) -> Result<PathBuf> {
        let (parent, name) = split_output(&self.output)?;
        let retired = parent.join(format!(".{}.retired-{}", name, Uuid::new_v4().simple()));

        let had_previous = fs::try_exists(&self.output).await?;
        if had_previous {
            fs::rename(&self.output, &retired).await?;
        }

        if let Err(err) = fs::rename(&self.root, &self.output).await {
            if had_previous {
                // Put the previous tree back before reporting
                let _ = fs::rename(&retired, &self.output).await;
            }
            let _ = fs::remove_dir_all(&self.root).await;
            return Err(err.into());
        }

        if had_previous {
            if let Err(err) = fs::remove_dir_all(&retired).await {
                tracing::warn!(path = %retired.display(), "Failed to remove previous tree: {}", err);
            }
        }

        tracing::info!(output = %self.output.display(), "Published built tree");
        Ok(self.output)
    }

    /// Throw the staged tree away
    pub async fn discard(self) -> Result<()> {
        fs::remove_dir_all(&self.root).await?;
        tracing::debug!(staging = %self.root.display(), "Discarded staging directory");
        Ok(())
    }
}

fn split_output(output: &Path) -> Result<(PathBuf, String)> {
    let name = output
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            CatalogError::config_invalid(format!(
                "output root {} has no usable directory name",
                output.display()
            ))
        })?
        .to_string();

    let parent = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    Ok((parent, name))
}

/// Leftover build directories next to the output root
#[derive(Debug, Default)]
struct Leftovers {
    staging: Vec<PathBuf>,
    retired: Vec<PathBuf>,
}

async fn find_leftovers(parent: &Path, name: &str) -> Result<Leftovers> {
    let staging_prefix = format!(".{}.staging-", name);
    let retired_prefix = format!(".{}.retired-", name);
    let mut leftovers = Leftovers::default();

    let mut entries = fs::read_dir(parent).await?;
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.starts_with(&staging_prefix) {
            leftovers.staging.push(entry.path());
        } else if file_name.starts_with(&retired_prefix) {
            leftovers.retired.push(entry.path());
        }
    }

    Ok(leftovers)
}

/// Restore an orphaned previous tree, then remove every other leftover
async fn recover_leftovers(parent: &Path, name: &str, output: &Path) -> Result<()> {
    let mut leftovers = find_leftovers(parent, name).await?;

    if !fs::try_exists(output).await? && !leftovers.retired.is_empty() {
        let mut newest: Option<(SystemTime, usize)> = None;
        for (position, path) in leftovers.retired.iter().enumerate() {
            let modified = fs::metadata(path)
                .await
                .and_then(|metadata| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if newest.map_or(true, |(time, _)| modified > time) {
                newest = Some((modified, position));
            }
        }

        if let Some((_, position)) = newest {
            let restored = leftovers.retired.swap_remove(position);
            fs::rename(&restored, output).await?;
            tracing::warn!(
                from = %restored.display(),
                output = %output.display(),
                "Restored previous tree left behind by an interrupted publish"
            );
        }
    }

    for path in leftovers.staging.iter().chain(&leftovers.retired) {
        tracing::debug!(path = %path.display(), "Removing leftover build directory");
        if let Err(err) = fs::remove_dir_all(path).await {
            tracing::warn!(path = %path.display(), "Failed to remove leftover: {}", err);
        }
    }

    Ok(())
}
