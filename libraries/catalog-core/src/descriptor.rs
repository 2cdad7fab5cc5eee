//! Library descriptor types and loader
//!
//! The descriptor is the declarative input of a build: the library title, its
//! artists, and each artist's releases with their source directories.

use crate::error::{CatalogError, Result};
use crate::layout;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level library description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    pub title: String,
    pub artists: Vec<Artist>,
}

/// An artist and the releases published under their directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    /// Directory relative to the library root, a single path component
    pub directory: String,
    /// Asset path of the artist image
    pub avatar: String,
    pub releases: Vec<Release>,
}

/// A release (album, EP, single...) of an artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Asset path of the cover image
    pub cover: String,
    pub date: String,
    /// Directory relative to the library root: `<artist directory>/<name>`
    pub directory: String,
}

impl LibraryDescriptor {
    /// Load and validate a descriptor from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CatalogError::ConfigMissing(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate a descriptor from JSON text
    pub fn from_json(contents: &str) -> Result<Self> {
        let descriptor: Self = serde_json::from_str(contents)
            .map_err(|e| CatalogError::config_invalid(e.to_string()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check the structural invariants the build and the server rely on
    pub fn validate(&self) -> Result<()> {
        require_non_empty("library title", &self.title)?;

        let mut artist_directories = HashSet::new();
        for artist in &self.artists {
            artist.validate()?;
            if !artist_directories.insert(artist.directory.as_str()) {
                return Err(CatalogError::config_invalid(format!(
                    "duplicate artist directory: {}",
                    artist.directory
                )));
            }
        }

        Ok(())
    }

    /// Total number of declared releases
    pub fn release_count(&self) -> usize {
        self.artists.iter().map(|artist| artist.releases.len()).sum()
    }
}

impl Artist {
    fn validate(&self) -> Result<()> {
        require_non_empty("artist name", &self.name)?;
        if !layout::is_single_component(&self.directory) {
            return Err(CatalogError::config_invalid(format!(
                "artist {} has invalid directory {:?}: expected a single path component",
                self.name, self.directory
            )));
        }

        let mut release_directories = HashSet::new();
        for release in &self.releases {
            require_non_empty("release title", &release.title)?;
            if layout::release_name(&self.directory, &release.directory).is_none() {
                return Err(CatalogError::config_invalid(format!(
                    "release {} has invalid directory {:?}: expected {}/<name>",
                    release.title, release.directory, self.directory
                )));
            }
            if !release_directories.insert(release.directory.as_str()) {
                return Err(CatalogError::config_invalid(format!(
                    "duplicate release directory for artist {}: {}",
                    self.name, release.directory
                )));
            }
        }

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::config_invalid(format!("{} is empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "title": "Label Catalog",
        "artists": [
            {
                "name": "The Band",
                "directory": "the-band",
                "avatar": "the-band/avatar.jpg",
                "releases": [
                    {
                        "title": "First",
                        "type": "album",
                        "cover": "the-band/first/cover.jpg",
                        "date": "2023-04-01",
                        "directory": "the-band/first"
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_release_type_field() {
        let descriptor = LibraryDescriptor::from_json(SAMPLE).unwrap();
        assert_eq!(descriptor.artists[0].releases[0].kind, "album");
        assert_eq!(descriptor.release_count(), 1);
    }

    #[test]
    fn missing_field_is_config_invalid() {
        let err = LibraryDescriptor::from_json(r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigInvalid(_)));
    }

    #[test]
    fn duplicate_artist_directory_is_rejected() {
        let mut descriptor = LibraryDescriptor::from_json(SAMPLE).unwrap();
        let mut twin = descriptor.artists[0].clone();
        twin.name = "Imposter".to_string();
        twin.releases.clear();
        descriptor.artists.push(twin);

        let err = descriptor.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate artist directory"));
    }

    #[test]
    fn duplicate_release_directory_is_rejected() {
        let mut descriptor = LibraryDescriptor::from_json(SAMPLE).unwrap();
        let again = descriptor.artists[0].releases[0].clone();
        descriptor.artists[0].releases.push(again);

        let err = descriptor.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate release directory"));
    }

    #[test]
    fn release_outside_artist_directory_is_rejected() {
        let mut descriptor = LibraryDescriptor::from_json(SAMPLE).unwrap();
        descriptor.artists[0].releases[0].directory = "elsewhere/first".to_string();

        assert!(matches!(
            descriptor.validate(),
            Err(CatalogError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn nested_artist_directory_is_rejected() {
        let mut descriptor = LibraryDescriptor::from_json(SAMPLE).unwrap();
        descriptor.artists[0].directory = "../escape".to_string();

        assert!(descriptor.validate().is_err());
    }
}
