//! Tempo compatibility gate.

use crate::analysis::AudioTrack;

use super::types::{SyncError, SyncResult, TempoComparison};

/// Default relative tempo tolerance (15%).
pub const DEFAULT_TEMPO_TOLERANCE: f64 = 0.15;

/// Decide whether two tempos are close enough to reconcile.
///
/// The relative difference is `|base - replacement| / base`; the divisor is
/// the base tempo by contract, not a symmetric measure. A difference exactly
/// equal to the tolerance passes.
///
/// Failure is terminal for the whole run: a large mismatch means the caller
/// paired unsuitable sources, and stretching across it would audibly mangle
/// both tracks.
pub fn check_compatible(
    base: &AudioTrack,
    replacement: &AudioTrack,
    tolerance: f64,
) -> SyncResult<TempoComparison> {
    debug_assert!(tolerance > 0.0);

    let base_bpm = base.tempo_bpm();
    let replacement_bpm = replacement.tempo_bpm();
    let relative_difference = (base_bpm - replacement_bpm).abs() / base_bpm;

    if relative_difference <= tolerance {
        Ok(TempoComparison {
            relative_difference,
        })
    } else {
        Err(SyncError::TempoMismatch {
            base_bpm,
            replacement_bpm,
            difference: relative_difference,
            tolerance,
        })
    }
}
