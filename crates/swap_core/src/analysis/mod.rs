//! Audio decoding and tempo/beat estimation.
//!
//! Media files are decoded to mono f64 sample buffers through ffmpeg, then
//! a spectral-flux onset envelope drives tempo estimation (autocorrelation)
//! and beat picking. The estimator sits behind the [`BeatEstimator`] trait
//! so the orchestrator can be tested without any signal processing.

mod decode;
mod estimator;
mod onset;
mod types;

pub use decode::{media_duration, FfmpegDecoder, DEFAULT_SAMPLE_RATE};
pub use estimator::{BeatEstimator, OnsetBeatEstimator, TempoEstimate};
pub use onset::{onset_envelope, OnsetConfig, OnsetEnvelope};
pub use types::{AnalysisError, AnalysisResult, AudioData, AudioTrack, TrackDecoder};
