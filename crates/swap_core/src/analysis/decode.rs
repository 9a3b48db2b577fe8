//! FFmpeg audio decoding.
//!
//! Decodes any supported container to mono f64 samples at the analysis
//! sample rate by piping raw PCM out of ffmpeg. The child process is waited
//! on inside the call; nothing downstream ever holds a decoder handle.

use std::path::Path;
use std::process::Command;

use super::types::{AnalysisError, AnalysisResult, AudioData, TrackDecoder};

/// Default analysis sample rate in Hz.
///
/// 22050 keeps envelope computation cheap while leaving plenty of bandwidth
/// for rhythm content.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Decoder that shells out to ffmpeg.
pub struct FfmpegDecoder {
    ffmpeg: String,
    sample_rate: u32,
}

impl FfmpegDecoder {
    /// Create a decoder using the given ffmpeg executable.
    pub fn new(ffmpeg: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            sample_rate,
        }
    }

    /// The sample rate this decoder emits.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg", DEFAULT_SAMPLE_RATE)
    }
}

impl TrackDecoder for FfmpegDecoder {
    fn decode(&self, path: &Path) -> AnalysisResult<AudioData> {
        if !path.exists() {
            return Err(AnalysisError::SourceNotFound(path.display().to_string()));
        }

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-i")
            .arg(path)
            .arg("-vn")
            .arg("-ac")
            .arg("1")
            .arg("-ar")
            .arg(self.sample_rate.to_string())
            .arg("-f")
            .arg("f64le")
            .arg("-acodec")
            .arg("pcm_f64le")
            .arg("pipe:1");

        tracing::debug!("Running ffmpeg decode: {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| AnalysisError::DecodeFailed(format!("Failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            return Err(AnalysisError::DecodeFailed(format!(
                "ffmpeg exited with code {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let samples = bytes_to_samples(&output.stdout);
        if samples.is_empty() {
            return Err(AnalysisError::InvalidAudio(format!(
                "No audio samples decoded from {}",
                path.display()
            )));
        }

        tracing::debug!(
            "Decoded {} samples ({:.2}s) from {}",
            samples.len(),
            samples.len() as f64 / self.sample_rate as f64,
            path.display()
        );

        Ok(AudioData::new(samples, self.sample_rate))
    }
}

/// Get the duration of a media file in seconds via ffprobe.
pub fn media_duration(ffprobe: &str, path: &Path) -> AnalysisResult<f64> {
    if !path.exists() {
        return Err(AnalysisError::SourceNotFound(path.display().to_string()));
    }

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| AnalysisError::DecodeFailed(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(AnalysisError::DecodeFailed(
            "ffprobe failed to report duration".to_string(),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    text.trim()
        .parse::<f64>()
        .map_err(|e| AnalysisError::DecodeFailed(format!("Failed to parse duration: {}", e)))
}

/// Reinterpret little-endian f64 bytes as samples.
fn bytes_to_samples(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut arr = [0u8; 8];
            arr.copy_from_slice(chunk);
            f64::from_le_bytes(arr)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_round_trip() {
        let values = [0.5_f64, -0.25, 1.0];
        let mut bytes = Vec::new();
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        let samples = bytes_to_samples(&bytes);
        assert_eq!(samples, values);
    }

    #[test]
    fn trailing_partial_chunk_is_ignored() {
        let bytes = vec![0u8; 9];
        assert_eq!(bytes_to_samples(&bytes).len(), 1);
    }

    #[test]
    fn decode_rejects_missing_file() {
        let decoder = FfmpegDecoder::default();
        let result = decoder.decode(Path::new("/nonexistent/input.mp4"));
        assert!(matches!(result, Err(AnalysisError::SourceNotFound(_))));
    }

    #[test]
    fn duration_rejects_missing_file() {
        let result = media_duration("ffprobe", Path::new("/nonexistent/input.mp4"));
        assert!(matches!(result, Err(AnalysisError::SourceNotFound(_))));
    }
}
