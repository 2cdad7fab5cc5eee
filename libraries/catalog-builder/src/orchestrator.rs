//! Build orchestration - walks the descriptor and writes the three index tiers
//!
//! Artists fan out concurrently; releases and tracks within an artist follow the
//! configured limits (serial by default). Each tier's index is written only after
//! every child below it has completed, and the whole tree is published only after
//! every artist has.

use crate::assets::{self, ensure_directory};
use crate::options::BuildOptions;
use crate::staging::Staging;
use crate::workers::WorkerPool;
use catalog_core::layout::{self, INDEX_FILE};
use catalog_core::{
    Artist, ArtistIndex, AssetKind, CatalogError, LibraryDescriptor, MetadataExtractor, Release,
    ReleaseIndex, Result, Track, Transcoder,
};
use futures_util::stream::{self, TryStreamExt};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How long a failed build waits for abandoned blocking jobs before discarding output
const DRAIN_GRACE: Duration = Duration::from_secs(10);

/// Summary of a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub title: String,
    pub artists: usize,
    pub releases: usize,
    pub tracks: usize,
    pub transcoded: usize,
    pub dry_run: bool,
    /// Published tree, `None` for dry runs
    pub output: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Counters accumulated bottom-up through the hierarchy
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    releases: usize,
    tracks: usize,
    transcoded: usize,
}

impl Tally {
    fn merge(self, other: Tally) -> Tally {
        Tally {
            releases: self.releases + other.releases,
            tracks: self.tracks + other.tracks,
            transcoded: self.transcoded + other.transcoded,
        }
    }
}

/// Library build orchestrator
pub struct Orchestrator {
    options: BuildOptions,
    extractor: Arc<dyn MetadataExtractor>,
    transcoder: Arc<dyn Transcoder>,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        options: BuildOptions,
        extractor: Arc<dyn MetadataExtractor>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            options,
            extractor,
            transcoder,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an external token to cancel builds (e.g. on Ctrl-C)
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build the served tree for `descriptor`
    ///
    /// Fails fast: the first error cancels every in-flight operation, discards the
    /// staged tree and is returned as-is. A previously published tree is left intact.
    pub async fn build(&self, descriptor: &LibraryDescriptor) -> Result<BuildReport> {
        self.options.validate()?;

        let started = Instant::now();
        let dry_run = self.options.dry_run;
        info!(
            artists = descriptor.artists.len(),
            releases = descriptor.release_count(),
            dry_run,
            "Building indexes for: {}",
            descriptor.title
        );

        let cancel = self.cancel.child_token();
        let pool = WorkerPool::new(self.options.workers, cancel.clone());
        let staging = if dry_run {
            None
        } else {
            Some(Staging::prepare(&self.options.output_root).await?)
        };

        let outcome = {
            let run = BuildRun {
                options: &self.options,
                extractor: Arc::clone(&self.extractor),
                transcoder: self.transcoder.as_ref(),
                pool: pool.clone(),
                dest: staging.as_ref().map(Staging::root),
            };
            run.build_library(descriptor).await
        };

        let tally = match outcome {
            Ok(tally) => tally,
            Err(err) => {
                cancel.cancel();
                error!("Error building library: {}", err);
                if !pool.drain(DRAIN_GRACE).await {
                    warn!("Abandoned workers still running after {:?}", DRAIN_GRACE);
                }
                if let Some(staging) = staging {
                    if let Err(cleanup) = staging.discard().await {
                        warn!("Failed to discard staged output: {}", cleanup);
                    }
                }
                return Err(err);
            }
        };

        let output = match staging {
            Some(staging) => Some(staging.publish().await?),
            None => None,
        };

        let report = BuildReport {
            title: descriptor.title.clone(),
            artists: descriptor.artists.len(),
            releases: tally.releases,
            tracks: tally.tracks,
            transcoded: tally.transcoded,
            dry_run,
            output,
            elapsed: started.elapsed(),
        };
        info!(
            artists = report.artists,
            releases = report.releases,
            tracks = report.tracks,
            transcoded = report.transcoded,
            "Library built successfully in {:?}",
            report.elapsed
        );
        Ok(report)
    }
}

/// State of one build invocation
struct BuildRun<'a> {
    options: &'a BuildOptions,
    extractor: Arc<dyn MetadataExtractor>,
    transcoder: &'a dyn Transcoder,
    pool: WorkerPool,
    /// Staging root; `None` in dry-run mode
    dest: Option<&'a Path>,
}

impl BuildRun<'_> {
    async fn build_library(&self, descriptor: &LibraryDescriptor) -> Result<Tally> {
        if let Some(dest) = self.dest {
            tokio::fs::copy(&self.options.descriptor_path, dest.join(INDEX_FILE)).await?;
        }

        let width = self.options.limits.artist_width(descriptor.artists.len());
        let tallies: Vec<Tally> = stream::iter(
            descriptor
                .artists
                .iter()
                .map(|artist| Ok::<_, CatalogError>(self.build_artist(artist))),
        )
        .try_buffer_unordered(width)
        .try_collect()
        .await?;

        Ok(tallies.into_iter().fold(Tally::default(), Tally::merge))
    }

    async fn build_artist(&self, artist: &Artist) -> Result<Tally> {
        info!(artist = %artist.name, "Building indexes for artist: {}", artist.name);

        let source = self.options.source_root.join(&artist.directory);
        ensure_directory(&source, AssetKind::Artist, &artist.name).await?;

        if let Some(dest) = self.dest {
            let from = source.clone();
            let target = dest.join(&artist.directory);
            let cancel = self.pool.cancellation().clone();
            let copied = self
                .pool
                .run_blocking("copy", &source, None, move || {
                    assets::copy_tree(&from, &target, &cancel)
                })
                .await?;
            debug!(artist = %artist.name, files = copied, "Copied artist directory");
        }

        let tallies: Vec<Tally> = stream::iter(
            artist
                .releases
                .iter()
                .map(|release| Ok::<_, CatalogError>(self.build_release(release))),
        )
        .try_buffer_unordered(self.options.limits.release_width())
        .try_collect()
        .await?;

        if let Some(dest) = self.dest {
            let path = dest.join(&artist.directory).join(INDEX_FILE);
            assets::write_document(&path, &ArtistIndex::from(artist)).await?;
        }

        Ok(tallies.into_iter().fold(Tally::default(), Tally::merge))
    }

    async fn build_release(&self, release: &Release) -> Result<Tally> {
        info!(release = %release.title, "Building indexes for release: {}", release.title);

        let source = self.options.source_root.join(&release.directory);
        ensure_directory(&source, AssetKind::Release, &release.title).await?;

        let directory = source.clone();
        let extension = self.options.source_extension.clone();
        let files = self
            .pool
            .run_blocking("enumerate", &source, None, move || {
                assets::enumerate_sources(&directory, &extension)
            })
            .await?;

        // `try_buffered` keeps enumeration order whatever the track concurrency
        let outcomes: Vec<(Track, bool)> = stream::iter(
            files
                .into_iter()
                .map(|file| Ok::<_, CatalogError>(self.build_track(release, file))),
        )
        .try_buffered(self.options.limits.track_width())
        .try_collect()
        .await?;

        let transcoded = outcomes.iter().filter(|(_, transcoded)| *transcoded).count();
        let tracks: Vec<Track> = outcomes.into_iter().map(|(track, _)| track).collect();
        flag_track_order(release, &tracks);

        let index = ReleaseIndex::new(release, tracks);
        match self.dest {
            Some(dest) => {
                let path = dest.join(&release.directory).join(INDEX_FILE);
                assets::write_document(&path, &index).await?;
            }
            None => debug!(
                release = %release.title,
                tracks = index.tracks.len(),
                "Dry run: release index not written"
            ),
        }

        Ok(Tally {
            releases: 1,
            tracks: index.tracks.len(),
            transcoded,
        })
    }

    /// Extract, derive, and (optionally) transcode one source file
    ///
    /// Returns the derived track and whether an artifact was transcoded.
    async fn build_track(&self, release: &Release, source: PathBuf) -> Result<(Track, bool)> {
        let (Some(file_name), Some(stem)) = (
            source.file_name().and_then(OsStr::to_str).map(str::to_owned),
            source.file_stem().and_then(OsStr::to_str).map(str::to_owned),
        ) else {
            return Err(CatalogError::InvalidFileName(source));
        };
        info!(track = %file_name, "Parsing track metadata: {}", file_name);

        let extractor = Arc::clone(&self.extractor);
        let path = source.clone();
        let tags = self
            .pool
            .run_blocking(
                "metadata extraction",
                &source,
                self.options.extract_timeout,
                move || extractor.extract(&path),
            )
            .await?;

        let served = layout::served_track_path(
            &release.directory,
            &stem,
            self.options.served_extension(),
        );
        let track = Track::new(tags, served);

        let Some(settings) = &self.options.transcode else {
            return Ok((track, false));
        };
        let Some(dest) = self.dest else {
            debug!(track = %file_name, "Dry run: skipping transcode");
            return Ok((track, false));
        };

        let staged = dest.join(&release.directory).join(&file_name);
        let target = dest.join(&track.path);
        self.pool
            .run(
                "transcode",
                &staged,
                settings.timeout,
                self.transcoder.transcode(&staged, &target, &settings.options),
            )
            .await?;

        // The staged copy of the source is redundant once the artifact exists
        tokio::fs::remove_file(&staged).await?;
        debug!(track = %file_name, artifact = %track.path, "Transcoded");

        Ok((track, true))
    }
}

/// Warn when filesystem order disagrees with track numbers
///
/// Indexes keep enumeration order; this only makes the disagreement visible.
fn flag_track_order(release: &Release, tracks: &[Track]) {
    let numbers: Vec<u32> = tracks.iter().filter_map(|track| track.track_no).collect();
    if numbers.windows(2).any(|pair| pair[0] > pair[1]) {
        warn!(
            release = %release.title,
            "Tracks of {} are indexed in filesystem order, which differs from track-number order",
            release.directory
        );
    }
}
