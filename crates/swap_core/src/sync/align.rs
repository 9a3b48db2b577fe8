//! Beat-grid alignment of two tempo-matched tracks.

use crate::analysis::AudioTrack;
use crate::models::SourceRole;

use super::types::{AlignmentPlan, SyncError, SyncResult};

/// Align the replacement track's beat grid against the base track's.
///
/// Both tracks must already be at the reconciled tempo. The anchor is the
/// *second* detected beat of the replacement against the *first* beat of
/// the base: beat detectors are noisier near signal boundaries, and
/// skipping the replacement's opening onset avoids anchoring on a false
/// positive.
///
/// The resulting start offset is the replacement-track time of the base
/// track's first beat; it may be negative when the replacement's second
/// beat falls before the base's first. Only a negative *overlap* is an
/// error.
pub fn align(base: &AudioTrack, replacement: &AudioTrack) -> SyncResult<AlignmentPlan> {
    require_beats(base, SourceRole::Base)?;
    require_beats(replacement, SourceRole::Replacement)?;

    let start_offset_secs = replacement.beats()[1] - base.beats()[0];
    let available = replacement.duration_secs() - start_offset_secs;
    let overlap_secs = base.duration_secs().min(available);

    if overlap_secs < 0.0 {
        return Err(SyncError::NegativeOverlap {
            start_offset: start_offset_secs,
            available,
        });
    }

    Ok(AlignmentPlan {
        start_offset_secs,
        overlap_secs,
    })
}

fn require_beats(track: &AudioTrack, role: SourceRole) -> SyncResult<()> {
    let found = track.beats().len();
    if found < 2 {
        return Err(SyncError::InsufficientBeats { role, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AudioData;

    fn track(duration_secs: f64, beats: Vec<f64>) -> AudioTrack {
        let sample_rate = 100;
        let samples = vec![0.0; (duration_secs * sample_rate as f64) as usize];
        AudioTrack::new(AudioData::new(samples, sample_rate), 120.0, beats)
    }

    #[test]
    fn anchors_second_replacement_beat_to_first_base_beat() {
        let base = track(180.0, vec![0.0, 0.52]);
        let replacement = track(185.0, vec![0.10, 0.58, 1.06]);

        let plan = align(&base, &replacement).unwrap();

        assert!((plan.start_offset_secs - 0.58).abs() < 1e-12);
        assert!((plan.overlap_secs - 180.0).abs() < 1e-12);
    }

    #[test]
    fn negative_offset_is_permitted() {
        // Base beats [2.0, 3.0, 4.0], replacement beats [0.5, 1.5, 2.5]:
        // offset = 1.5 - 2.0 = -0.5.
        let base = track(10.0, vec![2.0, 3.0, 4.0]);
        let replacement = track(8.0, vec![0.5, 1.5, 2.5]);

        let plan = align(&base, &replacement).unwrap();

        assert!((plan.start_offset_secs - (-0.5)).abs() < 1e-12);
        // min(10.0, 8.0 - (-0.5)) = min(10.0, 8.5) = 8.5
        assert!((plan.overlap_secs - 8.5).abs() < 1e-12);
    }

    #[test]
    fn overlap_clamps_to_base_duration() {
        let base = track(5.0, vec![0.0, 0.5]);
        let replacement = track(60.0, vec![0.2, 0.7, 1.2]);

        let plan = align(&base, &replacement).unwrap();
        assert!((plan.overlap_secs - 5.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_replacement_too_short_for_offset() {
        let base = track(30.0, vec![0.0, 0.5]);
        // Second beat at 9.5s but only 8s of audio: available = -1.5.
        let replacement = track(8.0, vec![9.0, 9.5, 10.0]);

        let err = align(&base, &replacement).unwrap_err();
        match err {
            SyncError::NegativeOverlap {
                start_offset,
                available,
            } => {
                assert!((start_offset - 9.5).abs() < 1e-12);
                assert!((available - (-1.5)).abs() < 1e-12);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn rejects_insufficient_beats() {
        let one_beat = track(10.0, vec![1.0]);
        let fine = track(10.0, vec![0.5, 1.0, 1.5]);

        match align(&one_beat, &fine).unwrap_err() {
            SyncError::InsufficientBeats { role, found } => {
                assert_eq!(role, SourceRole::Base);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match align(&fine, &one_beat).unwrap_err() {
            SyncError::InsufficientBeats { role, .. } => {
                assert_eq!(role, SourceRole::Replacement);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
