//! Final clip boundary computation.

use super::types::{AlignmentPlan, ClipSpec};

/// Derive the replacement-audio subclip from an alignment plan.
///
/// Only boundaries are computed here; cutting the audio and trimming the
/// video to `overlap_secs` are the transcode collaborator's job. A
/// zero-width clip is representable - the orchestrator rejects it before
/// mux so a degenerate file is never written.
pub fn final_clip(plan: &AlignmentPlan) -> ClipSpec {
    ClipSpec {
        start_secs: plan.start_offset_secs,
        end_secs: plan.start_offset_secs + plan.overlap_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_equals_overlap_exactly() {
        let plan = AlignmentPlan {
            start_offset_secs: 0.58,
            overlap_secs: 180.0,
        };
        let clip = final_clip(&plan);

        assert_eq!(clip.start_secs, 0.58);
        assert_eq!(clip.end_secs, 0.58 + 180.0);
        assert_eq!(clip.width_secs(), plan.overlap_secs);
    }

    #[test]
    fn zero_overlap_yields_zero_width() {
        let plan = AlignmentPlan {
            start_offset_secs: 1.0,
            overlap_secs: 0.0,
        };
        assert_eq!(final_clip(&plan).width_secs(), 0.0);
    }

    #[test]
    fn negative_offset_shifts_both_bounds() {
        let plan = AlignmentPlan {
            start_offset_secs: -0.5,
            overlap_secs: 8.5,
        };
        let clip = final_clip(&plan);
        assert_eq!(clip.start_secs, -0.5);
        assert_eq!(clip.end_secs, 8.0);
    }
}
