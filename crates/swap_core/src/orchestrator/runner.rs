//! Project runner: sets up a run, executes the pipeline, cleans up.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::logging::ProjectLogger;
use crate::models::ProjectSpec;

use super::errors::{PipelineError, PipelineResult};
use super::pipeline::Pipeline;
use super::types::{Context, ProjectState};

/// Runs a project through a pipeline with setup and teardown.
///
/// The runner owns the lifecycle around the pipeline: it creates the
/// working directory, builds the context, and removes every intermediate
/// artifact when the run ends, whether it succeeded or not.
pub struct ProjectRunner {
    settings: Settings,
}

impl ProjectRunner {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Run `project` through `pipeline`, returning the final file path.
    pub fn run(
        &self,
        project: ProjectSpec,
        logger: Arc<ProjectLogger>,
        pipeline: &Pipeline,
    ) -> PipelineResult<PathBuf> {
        let project_name = project.name.clone();

        let output_dir = PathBuf::from(&self.settings.paths.outputs_root);
        let work_dir = output_dir.join(&project_name);
        fs::create_dir_all(&work_dir).map_err(|e| {
            PipelineError::setup_failed(&project_name, format!("creating working directory: {}", e))
        })?;

        let ctx = Context::new(
            project,
            self.settings.clone(),
            work_dir.clone(),
            output_dir,
            logger,
        );
        let mut state = ProjectState::new();

        let run_result = pipeline.run(&ctx, &mut state);

        // Intermediates go away on every exit path; only the final file
        // survives a successful run.
        self.cleanup(&ctx, &state);

        run_result?;

        let output_path = state
            .mux
            .as_ref()
            .map(|m| m.output_path.clone())
            .ok_or_else(|| {
                PipelineError::setup_failed(&project_name, "pipeline recorded no final file")
            })?;

        ctx.logger
            .success(&format!("Final file: {}", output_path.display()));
        Ok(output_path)
    }

    /// Best-effort removal of tracked artifacts and the working directory.
    fn cleanup(&self, ctx: &Context, state: &ProjectState) {
        let keep = state.mux.as_ref().map(|m| m.output_path.clone());

        for artifact in &state.artifacts {
            if keep.as_deref() == Some(artifact.as_path()) {
                continue;
            }
            if artifact.exists() {
                match fs::remove_file(artifact) {
                    Ok(()) => ctx
                        .logger
                        .debug(&format!("Removed {}", artifact.display())),
                    Err(e) => ctx.logger.warn(&format!(
                        "Could not remove {}: {}",
                        artifact.display(),
                        e
                    )),
                }
            }
        }

        // Removes the working directory only once it is empty.
        if let Err(e) = fs::remove_dir(&ctx.work_dir) {
            ctx.logger
                .debug(&format!("Working directory kept: {}", e));
        }
    }
}
