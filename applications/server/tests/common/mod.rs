//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use catalog_core::{index, ArtistIndex, Release, ReleaseIndex, Track, TrackTags};
use catalog_server::{api, services::BuiltTree, state::AppState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Audio bytes of the first fixture track
pub const TRACK_BYTES: &[u8] = b"0123456789abcdefghij";

/// Release declared by the fixture tree
pub fn fixture_release() -> Release {
    Release {
        title: "First Light".to_string(),
        kind: "Album".to_string(),
        cover: "alpha/first/cover.jpg".to_string(),
        date: "2021-05-14".to_string(),
        directory: "alpha/first".to_string(),
    }
}

/// Tracks recorded in the fixture release index
pub fn fixture_tracks() -> Vec<Track> {
    let tags = |title: &str, number| TrackTags {
        title: Some(title.to_string()),
        artist: Some("Alpha".to_string()),
        date: Some("2021".to_string()),
        album: Some("First Light".to_string()),
        track_no: Some(number),
    };
    vec![
        Track::new(tags("Opening", 1), "alpha/first/01-Opening.m4a".to_string()),
        Track::new(tags("Closing", 2), "alpha/first/02-Closing.m4a".to_string()),
    ]
}

/// Write a published tree the way a build lays it out
pub fn write_built_tree(root: &Path) {
    let release = fixture_release();
    let release_dir = root.join(&release.directory);
    std::fs::create_dir_all(&release_dir).unwrap();

    std::fs::write(root.join("index.json"), b"{\"title\": \"Fixture\"}").unwrap();
    std::fs::write(root.join("alpha/avatar.jpg"), b"avatar").unwrap();
    std::fs::write(release_dir.join("cover.jpg"), b"cover").unwrap();
    std::fs::write(release_dir.join("01-Opening.m4a"), TRACK_BYTES).unwrap();
    std::fs::write(release_dir.join("02-Closing.m4a"), b"closing").unwrap();

    let artist = ArtistIndex {
        name: "Alpha".to_string(),
        avatar: "alpha/avatar.jpg".to_string(),
        releases: vec![release.clone()],
        directory: "alpha".to_string(),
    };
    std::fs::write(
        root.join("alpha/index.json"),
        index::to_document(&artist).unwrap(),
    )
    .unwrap();

    let release_index = ReleaseIndex::new(&release, fixture_tracks());
    std::fs::write(
        release_dir.join("index.json"),
        index::to_document(&release_index).unwrap(),
    )
    .unwrap();
}

/// Create a router over a freshly written fixture tree
pub fn create_test_app() -> (Router, TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("build");
    write_built_tree(&root);

    let tree = BuiltTree::new(&root, "m4a");
    let app = api::router(AppState::new(Arc::new(tree)));
    (app, temp_dir, root)
}

/// Send a GET request, optionally with a Range header
pub async fn get(app: &Router, uri: &str, range: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(range) = range {
        request = request.header("range", range);
    }

    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}
