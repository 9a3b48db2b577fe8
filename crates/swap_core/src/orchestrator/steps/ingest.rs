//! Ingest step: decode both sources and estimate their beat grids.

use crate::analysis::{AudioTrack, BeatEstimator, TrackDecoder};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ProjectState, TrackPair};

/// Decodes the downloaded files to mono PCM and runs beat estimation on
/// each, producing the track pair every later step works from.
pub struct IngestStep {
    decoder: Box<dyn TrackDecoder>,
    estimator: Box<dyn BeatEstimator>,
}

impl IngestStep {
    pub fn new(decoder: Box<dyn TrackDecoder>, estimator: Box<dyn BeatEstimator>) -> Self {
        Self { decoder, estimator }
    }

    fn analyze(&self, ctx: &Context, path: &std::path::Path, label: &str) -> StepResult<AudioTrack> {
        let data = self.decoder.decode(path)?;
        let estimate = self.estimator.estimate(&data)?;

        ctx.logger.info(&format!(
            "{}: {:.1} BPM, {} beats, {:.1}s",
            label,
            estimate.bpm,
            estimate.beats.len(),
            data.duration_secs
        ));

        Ok(AudioTrack::new(data, estimate.bpm, estimate.beats))
    }
}

impl PipelineStep for IngestStep {
    fn name(&self) -> &str {
        "Ingest"
    }

    fn description(&self) -> &str {
        "Decode audio and estimate beat grids"
    }

    fn validate_input(&self, _ctx: &Context, state: &ProjectState) -> StepResult<()> {
        if !state.has_fetch() {
            return Err(StepError::invalid_input("No fetched media recorded"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut ProjectState) -> StepResult<()> {
        let fetch = state
            .fetch
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("No fetched media recorded"))?;

        let base = self.analyze(ctx, &fetch.video.path, "Base")?;
        let replacement = self.analyze(ctx, &fetch.audio.path, "Replacement")?;

        state.tracks = Some(TrackPair { base, replacement });
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &ProjectState) -> StepResult<()> {
        let tracks = state
            .tracks
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("No analyzed tracks recorded"))?;

        for (track, label) in [(&tracks.base, "base"), (&tracks.replacement, "replacement")] {
            if track.beats().len() < 2 {
                return Err(StepError::invalid_output(format!(
                    "The {} track has too few beats for alignment",
                    label
                )));
            }
        }
        Ok(())
    }
}
