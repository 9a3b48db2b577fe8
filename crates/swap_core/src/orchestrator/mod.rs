//! Pipeline orchestration.
//!
//! A project run is a fixed sequence of steps, each validating its inputs,
//! doing one thing, and recording its output in the shared state:
//!
//! 1. Fetch - download base video and replacement audio
//! 2. Ingest - decode and estimate both beat grids
//! 3. TempoGate - refuse pairs whose tempos are too far apart
//! 4. Stretch - bring both sources to the reconciled target tempo
//! 5. Align - line up the stretched beat grids, derive the clip
//! 6. Mux - cut the clip and produce the final file
//!
//! [`ProjectRunner`] wraps the pipeline with directory setup and artifact
//! cleanup on every exit path.

mod errors;
mod pipeline;
mod runner;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use runner::ProjectRunner;
pub use step::PipelineStep;
pub use types::{Context, FetchOutput, MuxOutput, ProjectState, StretchOutput, TrackPair};

use crate::analysis::{FfmpegDecoder, OnsetBeatEstimator};
use crate::config::Settings;
use crate::media::{FfmpegMuxer, FfmpegStretcher, YtDlpFetcher};

use steps::{AlignStep, FetchStep, IngestStep, MuxStep, StretchStep, TempoGateStep};

/// Build the standard pipeline with the real external collaborators.
pub fn create_standard_pipeline(settings: &Settings) -> Pipeline {
    let ffmpeg = settings.tools.ffmpeg.clone();
    let sample_rate = settings.analysis.sample_rate;

    Pipeline::new()
        .with_step(FetchStep::new(Box::new(YtDlpFetcher::new(
            settings.tools.ytdlp.clone(),
        ))))
        .with_step(IngestStep::new(
            Box::new(FfmpegDecoder::new(ffmpeg.clone(), sample_rate)),
            Box::new(OnsetBeatEstimator::new()),
        ))
        .with_step(TempoGateStep)
        .with_step(StretchStep::new(
            Box::new(FfmpegStretcher::new(ffmpeg.clone())),
            Box::new(FfmpegDecoder::new(ffmpeg.clone(), sample_rate)),
            Box::new(OnsetBeatEstimator::new()),
        ))
        .with_step(AlignStep)
        .with_step(MuxStep::new(Box::new(
            FfmpegMuxer::new(ffmpeg).with_ffprobe(settings.tools.ffprobe.clone()),
        )))
}
