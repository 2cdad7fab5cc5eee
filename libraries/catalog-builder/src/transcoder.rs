/// Transcoder - FFmpeg wrapper producing streaming artifacts
use async_trait::async_trait;
use catalog_core::{CatalogError, Result, TranscodeOptions, Transcoder};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Whether the configured binary can be executed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|status| status.success())
    }

    /// FFmpeg arguments for one transcode
    pub fn arguments(source: &Path, dest: &Path, options: &TranscodeOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-i".into(),
            source.into(),
            "-y".into(), // Overwrite output file
            "-vn".into(), // Embedded cover art stays with the copied assets
            "-c:a".into(),
            options.codec.as_str().into(),
            "-b:a".into(),
            options.bitrate.as_str().into(),
        ];

        // Global metadata of input 0, or none at all
        args.push("-map_metadata".into());
        args.push(if options.preserve_tags { "0" } else { "-1" }.into());

        args.push(dest.into());
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, source: &Path, dest: &Path, options: &TranscodeOptions) -> Result<()> {
        tracing::debug!(
            source = %source.display(),
            dest = %dest.display(),
            codec = %options.codec,
            bitrate = %options.bitrate,
            "Transcoding"
        );

        let output = Command::new(&self.ffmpeg_path)
            .args(Self::arguments(source, dest, options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                CatalogError::transcode(
                    source,
                    format!("failed to run {}: {}", self.ffmpeg_path.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostics = if stderr.trim().is_empty() {
                format!("FFmpeg exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(CatalogError::transcode(source, diagnostics));
        }

        Ok(())
    }
}
