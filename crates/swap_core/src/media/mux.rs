//! Final audio/video muxing via ffmpeg.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::analysis::media_duration;
use crate::sync::ClipSpec;

use super::{run_tool, MediaError, MediaResult};

/// Seam for producing the final artifact.
pub trait Muxer: Send + Sync {
    /// Cut `clip` out of `audio`, trim `video` to the clip width, and mux
    /// the pair into `output`.
    fn mux(
        &self,
        video: &Path,
        audio: &Path,
        clip: &ClipSpec,
        output: &Path,
        audio_codec: &str,
    ) -> MediaResult<PathBuf>;
}

/// Muxer that shells out to ffmpeg in a single invocation.
pub struct FfmpegMuxer {
    ffmpeg: String,
    ffprobe: Option<String>,
}

impl FfmpegMuxer {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: None,
        }
    }

    /// Enable a post-mux duration check against the clip width.
    pub fn with_ffprobe(mut self, ffprobe: impl Into<String>) -> Self {
        self.ffprobe = Some(ffprobe.into());
        self
    }
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// Seek window for the replacement audio: `(-ss, -to, lead-in ms)`.
///
/// Alignment can legally produce a negative clip start (the replacement's
/// beat grid starts after the base's). ffmpeg clamps a negative `-ss` to
/// zero without complaint, which shifts the sync point, so instead the seek
/// starts at zero and the missing lead-in is reinstated as silence via
/// `adelay`. Total audio length stays `delay + end == width`.
fn seek_window(clip: &ClipSpec) -> (f64, f64, Option<u64>) {
    if clip.start_secs >= 0.0 {
        (clip.start_secs, clip.end_secs, None)
    } else {
        let delay_ms = (-clip.start_secs * 1000.0).round() as u64;
        (0.0, clip.end_secs, Some(delay_ms))
    }
}

impl Muxer for FfmpegMuxer {
    fn mux(
        &self,
        video: &Path,
        audio: &Path,
        clip: &ClipSpec,
        output: &Path,
        audio_codec: &str,
    ) -> MediaResult<PathBuf> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MediaError::Io {
                operation: "creating output directory".to_string(),
                source: e,
            })?;
        }

        let (seek_start, seek_end, lead_in) = seek_window(clip);

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-y")
            .arg("-i")
            .arg(video)
            // Seek the clip window within the replacement audio.
            .arg("-ss")
            .arg(format!("{:.6}", seek_start))
            .arg("-to")
            .arg(format!("{:.6}", seek_end))
            .arg("-i")
            .arg(audio)
            .arg("-map")
            .arg("0:v:0")
            .arg("-map")
            .arg("1:a:0")
            .arg("-c:v")
            .arg("copy")
            .arg("-c:a")
            .arg(audio_codec);
        if let Some(delay_ms) = lead_in {
            cmd.arg("-af").arg(format!("adelay={}:all=1", delay_ms));
        }
        // Trim the video to the synchronized window.
        cmd.arg("-t")
            .arg(format!("{:.6}", clip.width_secs()))
            .arg(output);

        run_tool("ffmpeg", &mut cmd)?;

        if !output.exists() {
            return Err(MediaError::OutputMissing(output.to_path_buf()));
        }

        if let Some(ref ffprobe) = self.ffprobe {
            match media_duration(ffprobe, output) {
                Ok(duration) => {
                    tracing::debug!("Muxed {:.2}s into {}", duration, output.display());
                    if (duration - clip.width_secs()).abs() > 0.5 {
                        tracing::warn!(
                            "Final duration {:.2}s deviates from clip width {:.2}s",
                            duration,
                            clip.width_secs()
                        );
                    }
                }
                Err(e) => tracing::debug!("Skipping duration check: {}", e),
            }
        }

        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_clip_seeks_directly() {
        let clip = ClipSpec {
            start_secs: 0.58,
            end_secs: 180.58,
        };
        let (start, end, lead_in) = seek_window(&clip);
        assert!((start - 0.58).abs() < 1e-12);
        assert!((end - 180.58).abs() < 1e-12);
        assert!(lead_in.is_none());
    }

    #[test]
    fn negative_clip_start_becomes_silent_lead_in() {
        // ffmpeg would silently clamp "-ss -0.5" to zero; the window must
        // instead seek from zero and delay the audio by the missing 0.5s.
        let clip = ClipSpec {
            start_secs: -0.5,
            end_secs: 8.0,
        };
        let (start, end, lead_in) = seek_window(&clip);
        assert_eq!(start, 0.0);
        assert!((end - 8.0).abs() < 1e-12);
        assert_eq!(lead_in, Some(500));
    }

    #[test]
    fn mux_fails_cleanly_without_ffmpeg_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let muxer = FfmpegMuxer::new("false");
        let clip = ClipSpec {
            start_secs: 0.0,
            end_secs: 1.0,
        };
        let result = muxer.mux(
            &dir.path().join("v.mp4"),
            &dir.path().join("a.wav"),
            &clip,
            &dir.path().join("out/out.mp4"),
            "aac",
        );
        assert!(matches!(
            result,
            Err(MediaError::CommandFailed { .. }) | Err(MediaError::Io { .. })
        ));
    }
}
