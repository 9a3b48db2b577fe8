//! Tempo and beat estimation from the onset envelope.

use super::onset::{onset_envelope, OnsetConfig, OnsetEnvelope};
use super::types::{AnalysisError, AnalysisResult, AudioData};

/// Output of tempo/beat estimation over one signal.
#[derive(Debug, Clone)]
pub struct TempoEstimate {
    /// Estimated tempo in beats per minute.
    pub bpm: f64,
    /// Detected beat onset times in seconds, strictly increasing.
    pub beats: Vec<f64>,
    /// Duration of the analyzed signal in seconds.
    pub duration_secs: f64,
}

/// Seam for tempo/beat estimation.
///
/// The orchestrator only ever talks to this trait; tests substitute
/// scripted estimators.
pub trait BeatEstimator: Send + Sync {
    /// Estimate tempo and beat times for a decoded signal.
    fn estimate(&self, audio: &AudioData) -> AnalysisResult<TempoEstimate>;
}

/// Estimator driven by onset-envelope autocorrelation.
///
/// Tempo is the autocorrelation peak of the onset envelope over the lag
/// range implied by `min_bpm..max_bpm`; beats are envelope peaks gated
/// against the mean strength and debounced to half a beat period.
pub struct OnsetBeatEstimator {
    config: OnsetConfig,
    min_bpm: f64,
    max_bpm: f64,
}

impl OnsetBeatEstimator {
    pub fn new() -> Self {
        Self {
            config: OnsetConfig::default(),
            min_bpm: 60.0,
            max_bpm: 200.0,
        }
    }

    /// Restrict the tempo search range.
    pub fn with_bpm_range(mut self, min_bpm: f64, max_bpm: f64) -> Self {
        self.min_bpm = min_bpm;
        self.max_bpm = max_bpm;
        self
    }

    /// Autocorrelation tempo pick over the configured BPM range.
    ///
    /// Returns the winning lag in frames.
    fn pick_tempo_lag(&self, env: &OnsetEnvelope) -> AnalysisResult<usize> {
        // lag(frames) = 60 / (bpm * hop_secs); slow tempos mean long lags.
        let min_lag = (60.0 / (self.max_bpm * env.hop_secs)).floor().max(1.0) as usize;
        let max_lag = (60.0 / (self.min_bpm * env.hop_secs)).ceil() as usize;

        if env.len() <= max_lag * 2 {
            return Err(AnalysisError::InvalidAudio(format!(
                "Signal too short for tempo estimation: {} envelope frames, need more than {}",
                env.len(),
                max_lag * 2
            )));
        }

        let mut scores = vec![0.0; max_lag + 1];
        for lag in min_lag..=max_lag {
            let n = env.len() - lag;
            scores[lag] = (0..n)
                .map(|i| env.strengths[i] * env.strengths[i + lag])
                .sum::<f64>()
                / n as f64;
        }

        let mut best_lag = min_lag;
        for lag in min_lag..=max_lag {
            if scores[lag] > scores[best_lag] {
                best_lag = lag;
            }
        }

        // A periodic envelope scores high at every multiple of its true
        // period, so the raw argmax often lands on the double-period
        // subharmonic (a 120 BPM signal read as 60). Fold down: move to the
        // half-period lag while its score holds up against the winner.
        while best_lag / 2 >= min_lag {
            let half = best_lag / 2;
            let window = half.saturating_sub(1).max(min_lag)..=(half + 1).min(max_lag);
            let candidate = window
                .max_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap())
                .unwrap_or(half);
            if candidate >= best_lag || scores[candidate] < 0.7 * scores[best_lag] {
                break;
            }
            best_lag = candidate;
        }

        Ok(best_lag)
    }

    /// Pick beat times: envelope local maxima above the strength gate,
    /// at least half a beat period apart.
    fn pick_beats(&self, env: &OnsetEnvelope, period_secs: f64) -> Vec<f64> {
        let strengths = &env.strengths;
        if strengths.len() < 3 {
            return Vec::new();
        }

        let mean = strengths.iter().sum::<f64>() / strengths.len() as f64;
        let gate = mean * 1.5;
        let min_spacing = period_secs * 0.5;

        let mut beats: Vec<f64> = Vec::new();
        for i in 1..strengths.len() - 1 {
            let s = strengths[i];
            if s <= gate || s < strengths[i - 1] || s < strengths[i + 1] {
                continue;
            }
            let t = env.frame_time(i);
            match beats.last().copied() {
                Some(last) if t - last < min_spacing => {
                    // Keep the stronger of the two within the debounce window.
                    let last_idx = (last / env.hop_secs).round() as usize;
                    if s > strengths[last_idx] {
                        if let Some(slot) = beats.last_mut() {
                            *slot = t;
                        }
                    }
                }
                _ => beats.push(t),
            }
        }

        beats
    }
}

impl Default for OnsetBeatEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl BeatEstimator for OnsetBeatEstimator {
    fn estimate(&self, audio: &AudioData) -> AnalysisResult<TempoEstimate> {
        if audio.is_empty() {
            return Err(AnalysisError::InvalidAudio("Empty signal".to_string()));
        }

        let env = onset_envelope(audio, &self.config);
        let lag = self.pick_tempo_lag(&env)?;
        let period_secs = lag as f64 * env.hop_secs;
        let bpm = 60.0 / period_secs;

        let beats = self.pick_beats(&env, period_secs);
        if beats.len() < 2 {
            return Err(AnalysisError::InsufficientBeats { found: beats.len() });
        }

        tracing::debug!(
            "Estimated {:.1} BPM with {} beats over {:.2}s",
            bpm,
            beats.len(),
            audio.duration_secs
        );

        Ok(TempoEstimate {
            bpm,
            beats,
            duration_secs: audio.duration_secs,
        })
    }
}
