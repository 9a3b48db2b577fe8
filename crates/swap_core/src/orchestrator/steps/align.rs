//! Align step: line up the two stretched beat grids and derive the clip.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ProjectState};
use crate::sync::{align, final_clip, SyncError};

/// Computes the alignment plan from the stretched tracks and the final
/// clip boundaries the mux step will cut.
pub struct AlignStep;

impl PipelineStep for AlignStep {
    fn name(&self) -> &str {
        "Align"
    }

    fn description(&self) -> &str {
        "Align beat grids and compute the final clip"
    }

    fn validate_input(&self, _ctx: &Context, state: &ProjectState) -> StepResult<()> {
        if !state.has_stretched() {
            return Err(StepError::invalid_input("No stretched media recorded"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut ProjectState) -> StepResult<()> {
        let stretched = state
            .stretched
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("No stretched media recorded"))?;

        let plan = align(&stretched.base, &stretched.replacement)?;
        ctx.logger.info(&format!(
            "Start offset {:.3}s, overlap {:.3}s",
            plan.start_offset_secs, plan.overlap_secs
        ));

        let clip = final_clip(&plan);
        if clip.width_secs() <= 0.0 {
            return Err(SyncError::EmptyClip.into());
        }
        ctx.logger.info(&format!(
            "Clip [{:.3}s, {:.3}s] ({:.3}s)",
            clip.start_secs,
            clip.end_secs,
            clip.width_secs()
        ));

        state.alignment = Some(plan);
        state.clip = Some(clip);
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &ProjectState) -> StepResult<()> {
        if state.alignment.is_none() || state.clip.is_none() {
            return Err(StepError::invalid_output("No alignment recorded"));
        }
        Ok(())
    }
}
