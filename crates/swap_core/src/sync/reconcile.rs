//! Tempo reconciliation.

use crate::analysis::AudioTrack;

use super::types::ReconciliationPlan;

/// Compute the shared target tempo and per-track stretch factors.
///
/// Pure function of the two tempo values; any pair of positive tempos
/// yields a valid plan. The plan performs no stretching itself - the
/// factors are handed to the time-stretch collaborator, and stretched media
/// is re-estimated to produce new tracks.
pub fn reconcile(base: &AudioTrack, replacement: &AudioTrack) -> ReconciliationPlan {
    ReconciliationPlan::from_tempos(base.tempo_bpm(), replacement.tempo_bpm())
}
