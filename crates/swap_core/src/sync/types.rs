//! Derived plan types and errors for tempo alignment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::SourceRole;

/// Alignment failures.
///
/// None of these are retried: each one means the caller picked an
/// unsuitable source pairing, and the diagnostic carries the numbers needed
/// to pick differently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Tempos differ by more than the tolerance allows.
    #[error(
        "Tempo difference {difference:.2} exceeds tolerance {tolerance:.2} \
         (base {base_bpm:.1} BPM, replacement {replacement_bpm:.1} BPM)"
    )]
    TempoMismatch {
        base_bpm: f64,
        replacement_bpm: f64,
        difference: f64,
        tolerance: f64,
    },

    /// A track has fewer than the two beats alignment needs.
    #[error("The {role} track has {found} detected beat(s); alignment needs at least 2")]
    InsufficientBeats { role: SourceRole, found: usize },

    /// The replacement runs out before the aligned window starts.
    #[error(
        "No usable overlap: replacement has {available:.2}s of audio \
         after start offset {start_offset:.2}s"
    )]
    NegativeOverlap { start_offset: f64, available: f64 },

    /// Alignment produced a zero-length window.
    #[error("Alignment produced a zero-length clip")]
    EmptyClip,
}

/// Result type for alignment operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Relative tempo difference between two tracks.
///
/// Transient: produced by the compatibility gate, consumed for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoComparison {
    /// `|base - replacement| / base`. The divisor is always the base
    /// track's tempo; downstream tolerance checks rely on this asymmetry.
    pub relative_difference: f64,
}

/// Shared target tempo and the stretch factor each track needs to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// Arithmetic mean of the two input tempos.
    pub target_tempo: f64,
    /// `target_tempo / base_tempo`.
    pub stretch_base: f64,
    /// `target_tempo / replacement_tempo`.
    pub stretch_replacement: f64,
}

impl ReconciliationPlan {
    /// Build a plan from two positive tempos.
    ///
    /// The mean splits the tempo gap between the tracks, so neither is
    /// stretched by more than half the relative difference.
    pub fn from_tempos(base_bpm: f64, replacement_bpm: f64) -> Self {
        let target_tempo = (base_bpm + replacement_bpm) / 2.0;
        Self {
            target_tempo,
            stretch_base: target_tempo / base_bpm,
            stretch_replacement: target_tempo / replacement_bpm,
        }
    }
}

/// Where the replacement audio lines up against the base track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentPlan {
    /// Time into the replacement track where the base track's first beat
    /// lands. May be negative.
    pub start_offset_secs: f64,
    /// Length of the usable synchronized window.
    pub overlap_secs: f64,
}

/// Boundaries of the final replacement-audio subclip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Clip start within the replacement track, in seconds.
    pub start_secs: f64,
    /// Clip end within the replacement track, in seconds.
    pub end_secs: f64,
}

impl ClipSpec {
    /// Clip length in seconds.
    pub fn width_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}
