//! Core types for audio analysis.

use std::path::Path;

use thiserror::Error;

/// Errors from decoding or estimation.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input file does not exist.
    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    /// ffmpeg/ffprobe failed to decode the input.
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    /// The signal is unusable for analysis (empty, too short).
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// The estimator found fewer beats than alignment needs.
    #[error("Detected only {found} beat(s); at least 2 are required")]
    InsufficientBeats { found: usize },
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Decoded audio signal.
///
/// Holds only sample data and metadata. Decoder handles are scoped to the
/// decode call and released before this value is constructed.
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Mono samples as f64.
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl AudioData {
    /// Create new audio data from samples.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        let duration_secs = samples.len() as f64 / sample_rate as f64;
        Self {
            samples,
            sample_rate,
            duration_secs,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Seam for decoding a media file into analyzable audio.
///
/// The production implementation shells out to ffmpeg; tests substitute
/// scripted decoders.
pub trait TrackDecoder: Send + Sync {
    /// Decode the file at `path` to mono samples at the analysis rate.
    fn decode(&self, path: &Path) -> AnalysisResult<AudioData>;
}

/// An audio signal together with its measured tempo and beat grid.
///
/// Immutable once constructed: changing the tempo of a track means
/// stretching the underlying media and building a new `AudioTrack` from the
/// re-decoded, re-estimated result.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    data: AudioData,
    tempo_bpm: f64,
    beats: Vec<f64>,
}

impl AudioTrack {
    /// Build a track from decoded audio and an estimate over that audio.
    pub fn new(data: AudioData, tempo_bpm: f64, beats: Vec<f64>) -> Self {
        debug_assert!(tempo_bpm > 0.0);
        debug_assert!(beats.windows(2).all(|w| w[0] < w[1]));
        Self {
            data,
            tempo_bpm,
            beats,
        }
    }

    /// Estimated tempo in beats per minute.
    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    /// Detected beat onset times in seconds, strictly increasing.
    pub fn beats(&self) -> &[f64] {
        &self.beats
    }

    /// Track duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.data.duration_secs
    }

    /// Sample rate of the decoded signal.
    pub fn sample_rate(&self) -> u32 {
        self.data.sample_rate
    }

    /// The decoded signal backing this track.
    pub fn data(&self) -> &AudioData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_data_computes_duration() {
        let data = AudioData::new(vec![0.0; 44100], 22050);
        assert!((data.duration_secs - 2.0).abs() < 1e-12);
        assert_eq!(data.len(), 44100);
        assert!(!data.is_empty());
    }

    #[test]
    fn track_exposes_metadata() {
        let data = AudioData::new(vec![0.0; 22050], 22050);
        let track = AudioTrack::new(data, 120.0, vec![0.1, 0.6]);

        assert_eq!(track.tempo_bpm(), 120.0);
        assert_eq!(track.beats(), &[0.1, 0.6]);
        assert!((track.duration_secs() - 1.0).abs() < 1e-12);
        assert_eq!(track.sample_rate(), 22050);
    }
}
