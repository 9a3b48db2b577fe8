//! Spectral-flux onset strength envelope.
//!
//! Follows the classic onset_strength recipe: Hann-windowed STFT magnitudes,
//! frame-to-frame difference, half-wave rectification, sum over bins. The
//! envelope is the input to both tempo autocorrelation and beat picking.

use std::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

use super::types::AudioData;

/// STFT parameters for envelope computation.
#[derive(Debug, Clone, Copy)]
pub struct OnsetConfig {
    /// Window size in samples.
    pub n_fft: usize,
    /// Hop between successive frames in samples.
    pub hop_length: usize,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
        }
    }
}

/// Onset strength per analysis frame.
#[derive(Debug, Clone)]
pub struct OnsetEnvelope {
    /// Normalized onset strength, one value per frame.
    pub strengths: Vec<f64>,
    /// Seconds between successive frames.
    pub hop_secs: f64,
}

impl OnsetEnvelope {
    /// Time in seconds of the center of frame `index`.
    ///
    /// Frames are centered by [`stft_magnitudes`] padding, so frame `i`
    /// covers `i * hop ± n_fft / 2` and this is its midpoint.
    pub fn frame_time(&self, index: usize) -> f64 {
        index as f64 * self.hop_secs
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.strengths.len()
    }

    /// Whether the envelope holds no frames.
    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
    }
}

/// Compute the onset strength envelope of a signal.
///
/// Returns an empty envelope when the signal is shorter than one window.
pub fn onset_envelope(audio: &AudioData, config: &OnsetConfig) -> OnsetEnvelope {
    let hop_secs = config.hop_length as f64 / audio.sample_rate as f64;
    let spectrogram = stft_magnitudes(&audio.samples, config);

    let num_frames = spectrogram.len();
    if num_frames < 2 {
        return OnsetEnvelope {
            strengths: Vec::new(),
            hop_secs,
        };
    }

    // Half-wave rectified spectral flux, summed over bins.
    let mut strengths = vec![0.0; num_frames];
    for frame in 1..num_frames {
        let mut flux = 0.0;
        for (cur, prev) in spectrogram[frame].iter().zip(&spectrogram[frame - 1]) {
            let diff = cur - prev;
            if diff > 0.0 {
                flux += diff;
            }
        }
        strengths[frame] = flux;
    }

    normalize(&mut strengths);

    OnsetEnvelope {
        strengths,
        hop_secs,
    }
}

/// Magnitude spectrogram, one Vec of bin magnitudes per frame.
///
/// The signal is zero-padded by half a window on each side so frame `i` is
/// centered on sample `i * hop_length`. Without the padding, energy gets
/// attributed to the window start and every onset reads tens of
/// milliseconds early.
fn stft_magnitudes(samples: &[f64], config: &OnsetConfig) -> Vec<Vec<f64>> {
    let n_fft = config.n_fft;
    if samples.len() < n_fft {
        return Vec::new();
    }

    let mut padded = vec![0.0; samples.len() + n_fft];
    padded[n_fft / 2..n_fft / 2 + samples.len()].copy_from_slice(samples);

    let window = hann_window(n_fft);
    let num_bins = n_fft / 2 + 1;

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n_fft);

    let mut frames = Vec::new();
    let mut start = 0;
    while start + n_fft <= padded.len() {
        let mut buffer: Vec<Complex<f64>> = padded[start..start + n_fft]
            .iter()
            .zip(&window)
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();

        fft.process(&mut buffer);

        frames.push(buffer[..num_bins].iter().map(|c| c.norm()).collect());
        start += config.hop_length;
    }

    frames
}

fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
        .collect()
}

fn normalize(values: &mut [f64]) {
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    if max > 1e-10 {
        for v in values.iter_mut() {
            *v /= max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exponentially decaying bursts every `interval` samples.
    fn impulse_train(len: usize, interval: usize) -> Vec<f64> {
        let mut samples = vec![0.0; len];
        for start in (0..len).step_by(interval) {
            for j in 0..50.min(len - start) {
                samples[start + j] = (-(j as f64) / 10.0).exp() * (j as f64 * 0.5).sin();
            }
        }
        samples
    }

    #[test]
    fn short_signal_yields_empty_envelope() {
        let audio = AudioData::new(vec![0.0; 100], 22050);
        let env = onset_envelope(&audio, &OnsetConfig::default());
        assert!(env.is_empty());
    }

    #[test]
    fn envelope_peaks_near_impulses() {
        let sr = 22050;
        let interval = sr as usize / 2; // one burst every 0.5s
        let audio = AudioData::new(impulse_train(sr as usize * 4, interval), sr);
        let env = onset_envelope(&audio, &OnsetConfig::default());

        assert!(!env.is_empty());

        // The strongest frame should land within one hop of some burst time.
        let (peak_idx, _) = env
            .strengths
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();
        let peak_time = env.frame_time(peak_idx);
        let nearest_burst = (peak_time / 0.5).round() * 0.5;
        assert!(
            (peak_time - nearest_burst).abs() < 2.0 * env.hop_secs,
            "peak at {:.3}s not near a burst",
            peak_time
        );
    }

    #[test]
    fn single_burst_is_attributed_at_its_time() {
        let sr = 22050;
        let mut samples = vec![0.0; sr as usize * 3];
        let burst_at = sr as usize * 3 / 2; // 1.5s
        for j in 0..50 {
            samples[burst_at + j] = (-(j as f64) / 10.0).exp() * (j as f64 * 0.5).sin();
        }
        let env = onset_envelope(&AudioData::new(samples, sr), &OnsetConfig::default());

        let (peak_idx, _) = env
            .strengths
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();
        assert!(
            (env.frame_time(peak_idx) - 1.5).abs() < 2.0 * env.hop_secs,
            "burst at 1.5s reported at {:.3}s",
            env.frame_time(peak_idx)
        );
    }

    #[test]
    fn envelope_is_normalized() {
        let sr = 22050;
        let audio = AudioData::new(impulse_train(sr as usize * 2, sr as usize / 2), sr);
        let env = onset_envelope(&audio, &OnsetConfig::default());

        let max = env.strengths.iter().cloned().fold(0.0_f64, f64::max);
        assert!((max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn frame_time_uses_hop() {
        let env = OnsetEnvelope {
            strengths: vec![0.0; 4],
            hop_secs: 0.02,
        };
        assert!((env.frame_time(3) - 0.06).abs() < 1e-12);
    }
}
