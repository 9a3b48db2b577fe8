//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::AudioTrack;
use crate::config::Settings;
use crate::logging::ProjectLogger;
use crate::media::FetchedMedia;
use crate::models::ProjectSpec;
use crate::sync::{AlignmentPlan, ClipSpec, ReconciliationPlan, TempoComparison};

/// Read-only context passed to pipeline steps.
///
/// Contains the project specification and shared resources that steps can
/// read but not modify. Mutable state goes in `ProjectState`. Progress and
/// diagnostics flow through the logger, which carries its own callback sink.
pub struct Context {
    /// Project specification (name, source URLs, tolerance override).
    pub project: ProjectSpec,
    /// Application settings.
    pub settings: Settings,
    /// Project working directory (downloads and intermediates).
    pub work_dir: PathBuf,
    /// Output directory for the final file.
    pub output_dir: PathBuf,
    /// Per-project logger.
    pub logger: Arc<ProjectLogger>,
}

impl Context {
    /// Create a new context for a project run.
    pub fn new(
        project: ProjectSpec,
        settings: Settings,
        work_dir: PathBuf,
        output_dir: PathBuf,
        logger: Arc<ProjectLogger>,
    ) -> Self {
        Self {
            project,
            settings,
            work_dir,
            output_dir,
            logger,
        }
    }

    /// Effective tempo tolerance: per-project override, else configured.
    pub fn tolerance(&self) -> f64 {
        self.project
            .tempo_tolerance
            .unwrap_or(self.settings.analysis.tempo_tolerance)
    }
}

/// Mutable project state that accumulates results from pipeline steps.
///
/// This is a write-once manifest: steps add new sections but do not
/// overwrite earlier ones.
#[derive(Default)]
pub struct ProjectState {
    /// When the run started (RFC 3339).
    pub started_at: Option<String>,
    /// Downloaded media (from the Fetch step).
    pub fetch: Option<FetchOutput>,
    /// Decoded and beat-analyzed tracks (from the Ingest step).
    pub tracks: Option<TrackPair>,
    /// Tempo gate verdict.
    pub comparison: Option<TempoComparison>,
    /// Reconciliation plan (target tempo and stretch factors).
    pub plan: Option<ReconciliationPlan>,
    /// Stretched media and re-analyzed tracks (from the Stretch step).
    pub stretched: Option<StretchOutput>,
    /// Beat alignment plan.
    pub alignment: Option<AlignmentPlan>,
    /// Final clip boundaries.
    pub clip: Option<ClipSpec>,
    /// Mux step results.
    pub mux: Option<MuxOutput>,
    /// Intermediate files to remove when the run ends.
    pub artifacts: Vec<PathBuf>,
}

impl ProjectState {
    /// Create a new state stamped with the current time.
    pub fn new() -> Self {
        Self {
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Record an intermediate file for end-of-run cleanup.
    pub fn track_artifact(&mut self, path: impl Into<PathBuf>) {
        self.artifacts.push(path.into());
    }

    pub fn has_fetch(&self) -> bool {
        self.fetch.is_some()
    }

    pub fn has_tracks(&self) -> bool {
        self.tracks.is_some()
    }

    pub fn has_stretched(&self) -> bool {
        self.stretched.is_some()
    }
}

/// Output from the Fetch step.
pub struct FetchOutput {
    /// Downloaded base video.
    pub video: FetchedMedia,
    /// Downloaded replacement audio.
    pub audio: FetchedMedia,
}

/// Beat-analyzed tracks for both sources.
pub struct TrackPair {
    pub base: AudioTrack,
    pub replacement: AudioTrack,
}

/// Output from the Stretch step.
pub struct StretchOutput {
    /// Retimed base video (audio stream dropped).
    pub video_path: PathBuf,
    /// Stretched replacement audio file.
    pub replacement_audio_path: PathBuf,
    /// Re-analyzed base track at the target tempo.
    pub base: AudioTrack,
    /// Re-analyzed replacement track at the target tempo.
    pub replacement: AudioTrack,
}

/// Output from the Mux step.
pub struct MuxOutput {
    /// Path to the final file.
    pub output_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_tracks_completion() {
        let state = ProjectState::new();
        assert!(state.started_at.is_some());
        assert!(!state.has_fetch());
        assert!(!state.has_tracks());
        assert!(state.artifacts.is_empty());
    }

    #[test]
    fn artifacts_accumulate() {
        let mut state = ProjectState::new();
        state.track_artifact("/tmp/a.mp4");
        state.track_artifact("/tmp/b.wav");
        assert_eq!(state.artifacts.len(), 2);
    }
}
