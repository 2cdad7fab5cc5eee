//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use catalog_builder::BuildOptions;
use catalog_core::{
    Artist, CatalogError, LibraryDescriptor, MetadataExtractor, Release, Result, TrackTags,
    TranscodeOptions, Transcoder,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("catalog_builder=debug")
        .try_init();
}

/// Extractor deriving tags from file stems like `03-Title`
///
/// Files whose stem contains `corrupt` fail as unreadable.
#[derive(Default)]
pub struct FakeExtractor {
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

impl FakeExtractor {
    pub fn slow(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetadataExtractor for FakeExtractor {
    fn extract(&self, path: &Path) -> Result<TrackTags> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.contains("corrupt") {
            return Err(CatalogError::unreadable_metadata(path, "no tag header"));
        }

        let (number, title) = match stem.split_once('-') {
            Some((number, title)) => (number.parse().ok(), Some(title.to_string())),
            None => (None, None),
        };

        Ok(TrackTags {
            title,
            artist: Some("Fixture Artist".to_string()),
            date: Some("2021".to_string()),
            album: None,
            track_no: number,
        })
    }
}

/// Transcoder that copies the source to the destination
///
/// Sources whose name contains `broken` fail with encoder diagnostics.
#[derive(Default)]
pub struct FakeTranscoder {
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

impl FakeTranscoder {
    pub fn slow(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, source: &Path, dest: &Path, _options: &TranscodeOptions) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if source.to_string_lossy().contains("broken") {
            return Err(CatalogError::transcode(source, "Invalid data found when processing input"));
        }

        tokio::fs::copy(source, dest).await?;
        Ok(())
    }
}

/// In-flight counter with its high-water mark
#[derive(Debug, Default, Clone, Copy)]
pub struct Occupancy {
    pub current: usize,
    pub peak: usize,
}

impl Occupancy {
    fn enter(&mut self) {
        self.current += 1;
        self.peak = self.peak.max(self.current);
    }

    fn leave(&mut self) {
        self.current -= 1;
    }
}

/// Copying transcoder that records how many transcodes overlap
///
/// Occupancy is kept for the whole build and per artist, the artist being the
/// directory two levels above the staged source.
pub struct TrackingTranscoder {
    delay: Duration,
    total: Mutex<Occupancy>,
    artists: Mutex<HashMap<String, Occupancy>>,
}

impl TrackingTranscoder {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            total: Mutex::new(Occupancy::default()),
            artists: Mutex::new(HashMap::new()),
        }
    }

    pub fn peak(&self) -> usize {
        self.total.lock().unwrap().peak
    }

    pub fn artist_peaks(&self) -> HashMap<String, usize> {
        self.artists
            .lock()
            .unwrap()
            .iter()
            .map(|(artist, occupancy)| (artist.clone(), occupancy.peak))
            .collect()
    }

    fn artist_of(source: &Path) -> String {
        source
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transcoder for TrackingTranscoder {
    async fn transcode(&self, source: &Path, dest: &Path, _options: &TranscodeOptions) -> Result<()> {
        let artist = Self::artist_of(source);
        self.total.lock().unwrap().enter();
        self.artists.lock().unwrap().entry(artist.clone()).or_default().enter();

        tokio::time::sleep(self.delay).await;
        let copied = tokio::fs::copy(source, dest).await;

        self.total.lock().unwrap().leave();
        if let Some(occupancy) = self.artists.lock().unwrap().get_mut(&artist) {
            occupancy.leave();
        }

        copied?;
        Ok(())
    }
}

/// A library on disk: source tree plus `index.json`
pub struct Fixture {
    pub dir: TempDir,
    pub descriptor: LibraryDescriptor,
}

impl Fixture {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("build")
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.root().join("index.json")
    }

    pub fn options(&self) -> BuildOptions {
        BuildOptions::new(self.root())
    }

    /// Names in the library root that look like staging or retired trees
    pub fn leftovers(&self) -> Vec<String> {
        std::fs::read_dir(self.root())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".build."))
            .collect()
    }
}

/// Layout: artist directory -> release name -> track file names
pub type Layout<'a> = &'a [(&'a str, &'a [(&'a str, &'a [&'a str])])];

/// Write a library with avatar/cover images and the given tracks
pub fn library(layout: Layout<'_>) -> Fixture {
    let dir = TempDir::new().unwrap();
    let mut artists = Vec::new();

    for (artist_dir, releases) in layout {
        let artist_path = dir.path().join(artist_dir);
        std::fs::create_dir_all(&artist_path).unwrap();
        std::fs::write(artist_path.join("avatar.jpg"), b"avatar").unwrap();

        let mut declared = Vec::new();
        for (release_name, tracks) in *releases {
            let release_path = artist_path.join(release_name);
            std::fs::create_dir_all(&release_path).unwrap();
            std::fs::write(release_path.join("cover.jpg"), b"cover").unwrap();
            for track in *tracks {
                std::fs::write(release_path.join(track), format!("audio:{}", track)).unwrap();
            }

            declared.push(Release {
                title: format!("{} ({})", release_name, artist_dir),
                kind: "Album".to_string(),
                cover: format!("{}/{}/cover.jpg", artist_dir, release_name),
                date: "2021-05-14".to_string(),
                directory: format!("{}/{}", artist_dir, release_name),
            });
        }

        artists.push(Artist {
            name: artist_dir.to_uppercase(),
            directory: (*artist_dir).to_string(),
            avatar: format!("{}/avatar.jpg", artist_dir),
            releases: declared,
        });
    }

    let descriptor = LibraryDescriptor {
        title: "Fixture Library".to_string(),
        artists,
    };
    std::fs::write(
        dir.path().join("index.json"),
        serde_json::to_string_pretty(&descriptor).unwrap(),
    )
    .unwrap();

    Fixture { dir, descriptor }
}

/// Two artists, three releases, seven tracks
pub fn sample_library() -> Fixture {
    library(&[
        (
            "alpha",
            &[
                ("first", &["01-Opening.flac", "02-Middle.flac", "03-Closing.flac"]),
                ("second", &["01-Return.flac", "02-Reprise.flac"]),
            ],
        ),
        ("beta", &[("debut", &["01-Hello.flac", "02-World.flac"])]),
    ])
}

/// Short silent mono PCM WAV
pub fn silent_wav() -> Vec<u8> {
    let sample_rate: u32 = 8000;
    let data_size: u32 = sample_rate / 10 * 2;

    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.resize(wav.len() + data_size as usize, 0);
    wav
}
