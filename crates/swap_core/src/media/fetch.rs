//! Media download via yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use crate::models::MediaKind;

use super::{run_tool, MediaError, MediaResult};

/// A downloaded media file.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    /// Local path of the downloaded file.
    pub path: PathBuf,
    /// Container kind, resolved once at download time.
    pub kind: MediaKind,
    /// Source title, for logging.
    pub title: String,
}

/// Seam for resolving a URL into a local media file.
pub trait MediaFetcher: Send + Sync {
    /// Download `url` into `output_dir`.
    ///
    /// `audio_only` selects the best audio-only stream; otherwise the best
    /// progressive mp4 stream (video with audio muxed in) is chosen.
    fn fetch(&self, url: &str, output_dir: &Path, audio_only: bool) -> MediaResult<FetchedMedia>;
}

/// Fetcher that shells out to yt-dlp.
pub struct YtDlpFetcher {
    ytdlp: String,
}

impl YtDlpFetcher {
    pub fn new(ytdlp: impl Into<String>) -> Self {
        Self {
            ytdlp: ytdlp.into(),
        }
    }

    /// Query source metadata without downloading.
    fn probe_title(&self, url: &str) -> MediaResult<String> {
        let mut cmd = Command::new(&self.ytdlp);
        cmd.args(["-J", "--no-playlist"]).arg(url);

        let output = run_tool("yt-dlp", &mut cmd).map_err(|e| MediaError::SourceUnavailable {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let json: Value =
            serde_json::from_slice(&output.stdout).map_err(|e| MediaError::Parse {
                what: "yt-dlp metadata".to_string(),
                message: e.to_string(),
            })?;

        Ok(json
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or("untitled")
            .to_string())
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

/// Deterministic download target inside the working directory.
pub(crate) fn download_target(output_dir: &Path, audio_only: bool) -> (PathBuf, MediaKind) {
    if audio_only {
        (output_dir.join("replacement_audio.mp3"), MediaKind::Mp3)
    } else {
        (output_dir.join("base_video.mp4"), MediaKind::Mp4)
    }
}

impl MediaFetcher for YtDlpFetcher {
    fn fetch(&self, url: &str, output_dir: &Path, audio_only: bool) -> MediaResult<FetchedMedia> {
        let title = self.probe_title(url)?;
        let (path, _) = download_target(output_dir, audio_only);

        let mut cmd = Command::new(&self.ytdlp);
        cmd.arg("--no-playlist");
        if audio_only {
            // Extract to mp3 so the analysis path sees a known kind.
            cmd.args(["-f", "bestaudio", "-x", "--audio-format", "mp3"]);
        } else {
            // Progressive stream: video and audio already muxed.
            cmd.args(["-f", "best[ext=mp4]"]);
        }
        cmd.arg("-o").arg(&path).arg(url);

        run_tool("yt-dlp", &mut cmd).map_err(|e| match e {
            MediaError::CommandFailed { message, .. } => MediaError::SourceUnavailable {
                url: url.to_string(),
                message,
            },
            other => other,
        })?;

        if !path.exists() {
            return Err(MediaError::OutputMissing(path));
        }

        // Kind is resolved here, once; downstream code never re-derives it.
        let kind = MediaKind::from_path(&path)?;

        tracing::debug!("Downloaded '{}' to {}", title, path.display());

        Ok(FetchedMedia { path, kind, title })
    }
}
