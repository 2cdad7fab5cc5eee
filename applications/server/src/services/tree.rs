/// Built tree service - read-only access to a published catalog
use crate::error::{Result, ServerError};
use catalog_core::layout::INDEX_FILE;
use catalog_core::ReleaseIndex;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct BuiltTree {
    root: PathBuf,
    served_extension: String,
}

impl BuiltTree {
    pub fn new(root: impl Into<PathBuf>, served_extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            served_extension: served_extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extension of the audio artifacts in this tree
    pub fn served_extension(&self) -> &str {
        &self.served_extension
    }

    /// Whether a build has been published at the root
    pub async fn exists(&self) -> bool {
        is_dir(&self.root).await
    }

    /// Absolute path of `relative` inside the tree
    pub fn path_of(&self, relative: &[&str]) -> PathBuf {
        relative
            .iter()
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Load the release index stored in `directory`
    pub async fn release_index(&self, directory: &Path) -> Result<Option<ReleaseIndex>> {
        let path = directory.join(INDEX_FILE);
        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let index = serde_json::from_slice(&contents)
            .map_err(|e| ServerError::Catalog(e.into()))?;
        Ok(Some(index))
    }

    /// Ensure `path` does not escape the tree (e.g. through a symlink)
    pub fn validate_path(&self, path: &Path) -> Result<()> {
        let canonical_root = self
            .root
            .canonicalize()
            .map_err(|e| ServerError::Internal(format!("Invalid tree root: {}", e)))?;

        let canonical_path = path.canonicalize().map_err(|_| ServerError::NotFound)?;

        if !canonical_path.starts_with(&canonical_root) {
            tracing::warn!(path = %path.display(), "Path escapes the built tree");
            return Err(ServerError::NotFound);
        }

        Ok(())
    }
}

pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
}

pub async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_release_index_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let tree = BuiltTree::new(temp_dir.path(), "m4a");

        assert!(tree.exists().await);
        assert!(tree.release_index(temp_dir.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_validate_path_rejects_outside_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("build");
        std::fs::create_dir(&root).unwrap();
        let outside = temp_dir.path().join("secret.txt");
        std::fs::write(&outside, b"secret").unwrap();
        let inside = root.join("cover.jpg");
        std::fs::write(&inside, b"jpg").unwrap();

        let tree = BuiltTree::new(&root, "m4a");
        assert!(tree.validate_path(&inside).is_ok());
        assert!(matches!(
            tree.validate_path(&root.join("../secret.txt")),
            Err(ServerError::NotFound)
        ));
    }

    #[test]
    fn test_path_of_joins_segments() {
        let tree = BuiltTree::new("/srv/build", "m4a");
        assert_eq!(
            tree.path_of(&["artist", "release", "01.m4a"]),
            PathBuf::from("/srv/build/artist/release/01.m4a")
        );
    }
}
