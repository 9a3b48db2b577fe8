//! End-to-end pipeline runs with mocked external collaborators.
//!
//! Every external boundary (download, decode, beat estimation, stretch,
//! mux) is replaced with a scripted mock, so these tests exercise the full
//! orchestration path: step ordering, tempo gating, reconciliation,
//! alignment arithmetic, clip derivation, and cleanup.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::tempdir;

use swap_core::analysis::{
    AnalysisResult, AudioData, BeatEstimator, TempoEstimate, TrackDecoder,
};
use swap_core::config::Settings;
use swap_core::logging::{LogConfig, ProjectLogger};
use swap_core::media::{
    FetchedMedia, MediaFetcher, MediaResult, Muxer, TimeStretcher,
};
use swap_core::models::{MediaKind, ProjectSpec};
use swap_core::orchestrator::steps::{
    AlignStep, FetchStep, IngestStep, MuxStep, StretchStep, TempoGateStep,
};
use swap_core::orchestrator::{Pipeline, PipelineError, ProjectRunner, StepError};
use swap_core::sync::{ClipSpec, SyncError};

/// Fetcher that writes placeholder files with the standard names.
struct MockFetcher;

impl MediaFetcher for MockFetcher {
    fn fetch(&self, _url: &str, output_dir: &Path, audio_only: bool) -> MediaResult<FetchedMedia> {
        let (name, kind) = if audio_only {
            ("replacement_audio.mp3", MediaKind::Mp3)
        } else {
            ("base_video.mp4", MediaKind::Mp4)
        };
        let path = output_dir.join(name);
        fs::write(&path, b"media").unwrap();
        Ok(FetchedMedia {
            path,
            kind,
            title: "mock".to_string(),
        })
    }
}

/// Decoder that replays scripted durations in call order.
struct ScriptedDecoder {
    durations: Mutex<VecDeque<f64>>,
}

impl ScriptedDecoder {
    fn new(durations: &[f64]) -> Self {
        Self {
            durations: Mutex::new(durations.iter().copied().collect()),
        }
    }
}

impl TrackDecoder for ScriptedDecoder {
    fn decode(&self, _path: &Path) -> AnalysisResult<AudioData> {
        let duration = self.durations.lock().pop_front().expect("decode script exhausted");
        let sample_rate = 100;
        let samples = vec![0.0; (duration * sample_rate as f64) as usize];
        Ok(AudioData::new(samples, sample_rate))
    }
}

/// Estimator that replays scripted estimates in call order.
struct ScriptedEstimator {
    estimates: Mutex<VecDeque<TempoEstimate>>,
}

impl ScriptedEstimator {
    fn new(estimates: Vec<TempoEstimate>) -> Self {
        Self {
            estimates: Mutex::new(estimates.into()),
        }
    }
}

impl BeatEstimator for ScriptedEstimator {
    fn estimate(&self, _audio: &AudioData) -> AnalysisResult<TempoEstimate> {
        Ok(self
            .estimates
            .lock()
            .pop_front()
            .expect("estimate script exhausted"))
    }
}

fn estimate(bpm: f64, beats: &[f64], duration_secs: f64) -> TempoEstimate {
    TempoEstimate {
        bpm,
        beats: beats.to_vec(),
        duration_secs,
    }
}

/// Stretcher that records factors and writes placeholder outputs.
struct RecordingStretcher {
    factors: Arc<Mutex<Vec<f64>>>,
}

impl TimeStretcher for RecordingStretcher {
    fn stretch(&self, input: &Path, factor: f64, audio_only: bool) -> MediaResult<PathBuf> {
        self.factors.lock().push(factor);
        let ext = if audio_only { "wav" } else { "mp4" };
        let stem = input.file_stem().unwrap().to_string_lossy();
        let output = input.with_file_name(format!("{}_retempo.{}", stem, ext));
        fs::write(&output, b"stretched").unwrap();
        Ok(output)
    }
}

/// Muxer that records the clip and writes the final file.
struct RecordingMuxer {
    clip: Arc<Mutex<Option<ClipSpec>>>,
}

impl Muxer for RecordingMuxer {
    fn mux(
        &self,
        _video: &Path,
        _audio: &Path,
        clip: &ClipSpec,
        output: &Path,
        _audio_codec: &str,
    ) -> MediaResult<PathBuf> {
        *self.clip.lock() = Some(*clip);
        fs::create_dir_all(output.parent().unwrap()).unwrap();
        fs::write(output, b"final").unwrap();
        Ok(output.to_path_buf())
    }
}

struct Harness {
    runner: ProjectRunner,
    logger: Arc<ProjectLogger>,
    outputs_root: PathBuf,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempdir().unwrap();
    let outputs_root = dir.path().join("outputs");

    let mut settings = Settings::default();
    settings.paths.outputs_root = outputs_root.to_string_lossy().to_string();

    let logger = Arc::new(
        ProjectLogger::new("e2e", dir.path().join("logs"), LogConfig::default(), None).unwrap(),
    );

    Harness {
        runner: ProjectRunner::new(settings),
        logger,
        outputs_root,
        _dir: dir,
    }
}

fn build_pipeline(
    ingest: (ScriptedDecoder, ScriptedEstimator),
    stretch: (ScriptedDecoder, ScriptedEstimator),
    factors: Arc<Mutex<Vec<f64>>>,
    clip: Arc<Mutex<Option<ClipSpec>>>,
) -> Pipeline {
    Pipeline::new()
        .with_step(FetchStep::new(Box::new(MockFetcher)))
        .with_step(IngestStep::new(Box::new(ingest.0), Box::new(ingest.1)))
        .with_step(TempoGateStep)
        .with_step(StretchStep::new(
            Box::new(RecordingStretcher { factors }),
            Box::new(stretch.0),
            Box::new(stretch.1),
        ))
        .with_step(AlignStep)
        .with_step(MuxStep::new(Box::new(RecordingMuxer { clip })))
}

#[test]
fn close_tempos_produce_aligned_clip() {
    let h = harness();

    // Ingest: base 118 BPM over 180s, replacement 122 BPM over 185s.
    let ingest_decoder = ScriptedDecoder::new(&[180.0, 185.0]);
    let ingest_estimator = ScriptedEstimator::new(vec![
        estimate(118.0, &[0.0, 0.52, 1.04], 180.0),
        estimate(122.0, &[0.10, 0.58, 1.06], 185.0),
    ]);

    // Post-stretch: both at the 120 BPM target.
    let stretch_decoder = ScriptedDecoder::new(&[180.0, 185.0]);
    let stretch_estimator = ScriptedEstimator::new(vec![
        estimate(120.0, &[0.0, 0.50, 1.00], 180.0),
        estimate(120.0, &[0.10, 0.58, 1.08], 185.0),
    ]);

    let factors = Arc::new(Mutex::new(Vec::new()));
    let clip = Arc::new(Mutex::new(None));
    let pipeline = build_pipeline(
        (ingest_decoder, ingest_estimator),
        (stretch_decoder, stretch_estimator),
        factors.clone(),
        clip.clone(),
    );

    let output = h
        .runner
        .run(
            ProjectSpec::new("close_tempos", "http://v", "http://a"),
            h.logger.clone(),
            &pipeline,
        )
        .unwrap();

    assert_eq!(output, h.outputs_root.join("close_tempos.mp4"));
    assert!(output.exists());

    // Stretch factors toward the 120 BPM mean: video, base audio, replacement.
    let factors = factors.lock();
    assert_eq!(factors.len(), 3);
    assert!((factors[0] - 120.0 / 118.0).abs() < 1e-9);
    assert!((factors[1] - 120.0 / 118.0).abs() < 1e-9);
    assert!((factors[2] - 120.0 / 122.0).abs() < 1e-9);

    // Offset anchors the replacement's second beat to the base's first:
    // 0.58 - 0.0. Overlap is min(180, 185 - 0.58) = 180.
    let clip = clip.lock().expect("mux never ran");
    assert!((clip.start_secs - 0.58).abs() < 1e-9);
    assert!((clip.end_secs - 180.58).abs() < 1e-9);

    // Intermediates are gone; the working directory has been removed.
    assert!(!h.outputs_root.join("close_tempos").exists());
}

#[test]
fn distant_tempos_fail_at_the_gate() {
    let h = harness();

    let ingest_decoder = ScriptedDecoder::new(&[180.0, 185.0]);
    let ingest_estimator = ScriptedEstimator::new(vec![
        estimate(100.0, &[0.0, 0.6], 180.0),
        estimate(130.0, &[0.1, 0.56], 185.0),
    ]);

    let factors = Arc::new(Mutex::new(Vec::new()));
    let clip = Arc::new(Mutex::new(None));
    let pipeline = build_pipeline(
        (ingest_decoder, ingest_estimator),
        (ScriptedDecoder::new(&[]), ScriptedEstimator::new(vec![])),
        factors.clone(),
        clip.clone(),
    );

    let err = h
        .runner
        .run(
            ProjectSpec::new("distant_tempos", "http://v", "http://a"),
            h.logger.clone(),
            &pipeline,
        )
        .unwrap_err();

    match err {
        PipelineError::StepFailed {
            step_name,
            source: StepError::Sync(SyncError::TempoMismatch { difference, .. }),
            ..
        } => {
            assert_eq!(step_name, "TempoGate");
            assert!((difference - 0.30).abs() < 1e-9);
        }
        other => panic!("unexpected error: {}", other),
    }

    // Nothing was stretched or muxed; downloads were cleaned up.
    assert!(factors.lock().is_empty());
    assert!(clip.lock().is_none());
    assert!(!h
        .outputs_root
        .join("distant_tempos")
        .join("base_video.mp4")
        .exists());
}

#[test]
fn raised_tolerance_admits_the_same_pair() {
    let h = harness();

    let ingest_decoder = ScriptedDecoder::new(&[60.0, 65.0]);
    let ingest_estimator = ScriptedEstimator::new(vec![
        estimate(100.0, &[0.0, 0.6], 60.0),
        estimate(130.0, &[0.1, 0.56], 65.0),
    ]);

    let stretch_decoder = ScriptedDecoder::new(&[60.0, 65.0]);
    let stretch_estimator = ScriptedEstimator::new(vec![
        estimate(115.0, &[0.0, 0.52], 60.0),
        estimate(115.0, &[0.1, 0.62], 65.0),
    ]);

    let factors = Arc::new(Mutex::new(Vec::new()));
    let clip = Arc::new(Mutex::new(None));
    let pipeline = build_pipeline(
        (ingest_decoder, ingest_estimator),
        (stretch_decoder, stretch_estimator),
        factors.clone(),
        clip.clone(),
    );

    let project =
        ProjectSpec::new("admitted", "http://v", "http://a").with_tolerance(0.35);
    let output = h.runner.run(project, h.logger.clone(), &pipeline).unwrap();
    assert!(output.exists());

    // Target tempo is the mean, 115 BPM.
    let factors = factors.lock();
    assert!((factors[0] - 1.15).abs() < 1e-9);
    assert!((factors[2] - 115.0 / 130.0).abs() < 1e-9);
}

#[test]
fn replacement_too_short_fails_alignment() {
    let h = harness();

    let ingest_decoder = ScriptedDecoder::new(&[30.0, 8.0]);
    let ingest_estimator = ScriptedEstimator::new(vec![
        estimate(120.0, &[0.0, 0.5], 30.0),
        estimate(120.0, &[9.0, 9.5, 10.0], 8.0),
    ]);

    let stretch_decoder = ScriptedDecoder::new(&[30.0, 8.0]);
    let stretch_estimator = ScriptedEstimator::new(vec![
        estimate(120.0, &[0.0, 0.5], 30.0),
        estimate(120.0, &[9.0, 9.5, 10.0], 8.0),
    ]);

    let factors = Arc::new(Mutex::new(Vec::new()));
    let clip = Arc::new(Mutex::new(None));
    let pipeline = build_pipeline(
        (ingest_decoder, ingest_estimator),
        (stretch_decoder, stretch_estimator),
        factors,
        clip.clone(),
    );

    let err = h
        .runner
        .run(
            ProjectSpec::new("too_short", "http://v", "http://a"),
            h.logger.clone(),
            &pipeline,
        )
        .unwrap_err();

    match err {
        PipelineError::StepFailed {
            step_name,
            source: StepError::Sync(SyncError::NegativeOverlap { .. }),
            ..
        } => assert_eq!(step_name, "Align"),
        other => panic!("unexpected error: {}", other),
    }
    assert!(clip.lock().is_none());
}
