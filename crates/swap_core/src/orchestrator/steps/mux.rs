//! Mux step: cut the clip and produce the final file.

use crate::media::Muxer;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, MuxOutput, ProjectState};

/// Cuts the aligned clip out of the stretched replacement audio and muxes
/// it under the stretched video into `<output_dir>/<project>.mp4`.
pub struct MuxStep {
    muxer: Box<dyn Muxer>,
}

impl MuxStep {
    pub fn new(muxer: Box<dyn Muxer>) -> Self {
        Self { muxer }
    }
}

impl PipelineStep for MuxStep {
    fn name(&self) -> &str {
        "Mux"
    }

    fn description(&self) -> &str {
        "Mux the aligned audio clip under the video"
    }

    fn validate_input(&self, _ctx: &Context, state: &ProjectState) -> StepResult<()> {
        if !state.has_stretched() {
            return Err(StepError::invalid_input("No stretched media recorded"));
        }
        if state.clip.is_none() {
            return Err(StepError::invalid_input("No clip recorded"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut ProjectState) -> StepResult<()> {
        let stretched = state
            .stretched
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("No stretched media recorded"))?;
        let clip = state
            .clip
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("No clip recorded"))?;

        let output = ctx.output_dir.join(format!("{}.mp4", ctx.project.name));
        ctx.logger
            .section(&format!("Muxing final file: {}", output.display()));

        let output_path = self.muxer.mux(
            &stretched.video_path,
            &stretched.replacement_audio_path,
            clip,
            &output,
            "aac",
        )?;

        state.mux = Some(MuxOutput { output_path });
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &ProjectState) -> StepResult<()> {
        let mux = state
            .mux
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("No mux result recorded"))?;

        if !mux.output_path.exists() {
            return Err(StepError::invalid_output(format!(
                "Final file missing: {}",
                mux.output_path.display()
            )));
        }
        Ok(())
    }
}
