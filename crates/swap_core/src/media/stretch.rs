//! Tempo-domain time stretching via ffmpeg.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{run_tool, MediaError, MediaResult};

/// Seam for tempo-only time stretching.
///
/// Output duration scales by `1/factor`; pitch is preserved (tempo-domain
/// stretch, not resampling).
pub trait TimeStretcher: Send + Sync {
    /// Stretch `input` by `factor`.
    ///
    /// With `audio_only` the result is a wav of the input's audio stream;
    /// otherwise the video stream is retimed and its audio dropped (the
    /// replacement audio is muxed in later).
    fn stretch(&self, input: &Path, factor: f64, audio_only: bool) -> MediaResult<PathBuf>;
}

/// Stretcher that shells out to ffmpeg.
pub struct FfmpegStretcher {
    ffmpeg: String,
}

impl FfmpegStretcher {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }
}

impl Default for FfmpegStretcher {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl TimeStretcher for FfmpegStretcher {
    fn stretch(&self, input: &Path, factor: f64, audio_only: bool) -> MediaResult<PathBuf> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(MediaError::InvalidStretchFactor(factor));
        }

        let output = retempo_path(input, audio_only);

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-y").arg("-i").arg(input);
        if audio_only {
            cmd.arg("-vn")
                .arg("-filter:a")
                .arg(atempo_chain(factor))
                .arg(&output);
        } else {
            cmd.arg("-an")
                .arg("-filter:v")
                .arg(format!("setpts=PTS/{:.6}", factor))
                .arg(&output);
        }

        run_tool("ffmpeg", &mut cmd)?;

        if !output.exists() {
            return Err(MediaError::OutputMissing(output));
        }

        Ok(output)
    }
}

/// Output path for a stretched file: `<stem>_retempo.<ext>`.
fn retempo_path(input: &Path, audio_only: bool) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "input".to_string());
    let ext = if audio_only {
        "wav".to_string()
    } else {
        input
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "mp4".to_string())
    };
    input.with_file_name(format!("{}_retempo.{}", stem, ext))
}

/// Build an atempo filter expression for an arbitrary positive factor.
///
/// ffmpeg caps each atempo instance to [0.5, 2.0], so factors outside that
/// range are factored into a chain whose product equals the requested
/// factor.
fn atempo_chain(factor: f64) -> String {
    let mut remaining = factor;
    let mut stages = Vec::new();

    while remaining > 2.0 {
        stages.push(2.0);
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        stages.push(0.5);
        remaining /= 0.5;
    }
    stages.push(remaining);

    stages
        .iter()
        .map(|f| format!("atempo={:.6}", f))
        .collect::<Vec<_>>()
        .join(",")
}
