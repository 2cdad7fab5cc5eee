//! Generated index documents and derived track records

use crate::descriptor::{Artist, Release};
use serde::{Deserialize, Serialize};

/// Tags read from one source audio file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_no: Option<u32>,
}

/// A track as recorded in a release index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_no: Option<u32>,
    /// Relative path of the served artifact
    pub path: String,
}

impl Track {
    pub fn new(tags: TrackTags, path: String) -> Self {
        Self {
            title: tags.title,
            artist: tags.artist,
            date: tags.date,
            album: tags.album,
            track_no: tags.track_no,
            path,
        }
    }
}

/// `index.json` written inside each artist directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistIndex {
    pub name: String,
    pub avatar: String,
    pub releases: Vec<Release>,
    pub directory: String,
}

impl From<&Artist> for ArtistIndex {
    fn from(artist: &Artist) -> Self {
        Self {
            name: artist.name.clone(),
            avatar: artist.avatar.clone(),
            releases: artist.releases.clone(),
            directory: artist.directory.clone(),
        }
    }
}

/// `index.json` written inside each release directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseIndex {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub cover: String,
    pub date: String,
    pub directory: String,
    pub tracks: Vec<Track>,
}

impl ReleaseIndex {
    pub fn new(release: &Release, tracks: Vec<Track>) -> Self {
        Self {
            title: release.title.clone(),
            kind: release.kind.clone(),
            cover: release.cover.clone(),
            date: release.date.clone(),
            directory: release.directory.clone(),
            tracks,
        }
    }

    /// Find the track whose served artifact lives at `path`
    pub fn find_track(&self, path: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| track.path == path)
    }
}

/// Serialize an index document the way it is written to disk
pub fn to_document<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release() -> Release {
        Release {
            title: "First".to_string(),
            kind: "ep".to_string(),
            cover: "band/first/cover.jpg".to_string(),
            date: "2022".to_string(),
            directory: "band/first".to_string(),
        }
    }

    #[test]
    fn track_serializes_camel_case_and_skips_missing_tags() {
        let tags = TrackTags {
            title: Some("Opening".to_string()),
            track_no: Some(1),
            ..TrackTags::default()
        };
        let track = Track::new(tags, "band/first/01.m4a".to_string());

        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["trackNo"], 1);
        assert_eq!(json["title"], "Opening");
        assert!(json.get("artist").is_none());
    }

    #[test]
    fn release_index_keeps_directory_and_type() {
        let index = ReleaseIndex::new(&release(), Vec::new());
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["type"], "ep");
        assert_eq!(json["directory"], "band/first");
    }

    #[test]
    fn find_track_matches_exact_path() {
        let tracks = vec![
            Track::new(TrackTags::default(), "band/first/01.m4a".to_string()),
            Track::new(TrackTags::default(), "band/first/02.m4a".to_string()),
        ];
        let index = ReleaseIndex::new(&release(), tracks);

        assert!(index.find_track("band/first/02.m4a").is_some());
        assert!(index.find_track("band/first/02").is_none());
    }

    #[test]
    fn documents_use_four_space_indent() {
        let document = to_document(&ReleaseIndex::new(&release(), Vec::new())).unwrap();
        let text = String::from_utf8(document).unwrap();
        assert!(text.contains("\n    \"title\": \"First\""));
    }
}
