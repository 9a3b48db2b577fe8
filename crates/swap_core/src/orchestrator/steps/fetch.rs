//! Fetch step: download both sources.

use crate::media::MediaFetcher;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, FetchOutput, ProjectState};

/// Downloads the base video and the replacement audio into the working
/// directory.
pub struct FetchStep {
    fetcher: Box<dyn MediaFetcher>,
}

impl FetchStep {
    pub fn new(fetcher: Box<dyn MediaFetcher>) -> Self {
        Self { fetcher }
    }
}

impl PipelineStep for FetchStep {
    fn name(&self) -> &str {
        "Fetch"
    }

    fn description(&self) -> &str {
        "Download base video and replacement audio"
    }

    fn validate_input(&self, ctx: &Context, _state: &ProjectState) -> StepResult<()> {
        if !ctx.work_dir.exists() {
            return Err(StepError::invalid_input(format!(
                "Working directory does not exist: {}",
                ctx.work_dir.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut ProjectState) -> StepResult<()> {
        ctx.logger
            .section(&format!("Fetching base video: {}", ctx.project.video_url));
        let video = self
            .fetcher
            .fetch(&ctx.project.video_url, &ctx.work_dir, false)?;
        ctx.logger
            .info(&format!("Base video: '{}' -> {}", video.title, video.path.display()));
        state.track_artifact(&video.path);

        ctx.logger.section(&format!(
            "Fetching replacement audio: {}",
            ctx.project.audio_url
        ));
        let audio = self
            .fetcher
            .fetch(&ctx.project.audio_url, &ctx.work_dir, true)?;
        ctx.logger.info(&format!(
            "Replacement audio: '{}' -> {}",
            audio.title,
            audio.path.display()
        ));
        state.track_artifact(&audio.path);

        state.fetch = Some(FetchOutput { video, audio });
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &ProjectState) -> StepResult<()> {
        let fetch = state
            .fetch
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("No fetched media recorded"))?;

        if !fetch.audio.kind.is_audio_only() {
            return Err(StepError::invalid_output(
                "Replacement source resolved to a video container",
            ));
        }
        Ok(())
    }
}
