//! Tempo gate step: refuse source pairs whose tempos are too far apart.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ProjectState};
use crate::sync::check_compatible;

/// Applies the tempo compatibility gate before any media is modified.
pub struct TempoGateStep;

impl PipelineStep for TempoGateStep {
    fn name(&self) -> &str {
        "TempoGate"
    }

    fn description(&self) -> &str {
        "Check the two tempos are close enough to reconcile"
    }

    fn validate_input(&self, _ctx: &Context, state: &ProjectState) -> StepResult<()> {
        if !state.has_tracks() {
            return Err(StepError::invalid_input("No analyzed tracks recorded"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut ProjectState) -> StepResult<()> {
        let tracks = state
            .tracks
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("No analyzed tracks recorded"))?;

        let tolerance = ctx.tolerance();
        let comparison = check_compatible(&tracks.base, &tracks.replacement, tolerance)?;

        ctx.logger.info(&format!(
            "Tempo difference {:.3} within tolerance {:.3} (base {:.1} BPM, replacement {:.1} BPM)",
            comparison.relative_difference,
            tolerance,
            tracks.base.tempo_bpm(),
            tracks.replacement.tempo_bpm()
        ));

        state.comparison = Some(comparison);
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &ProjectState) -> StepResult<()> {
        if state.comparison.is_none() {
            return Err(StepError::invalid_output("No tempo comparison recorded"));
        }
        Ok(())
    }
}
