//! Pipeline runner that executes steps in sequence.

use crate::media::MediaError;

use super::errors::{PipelineError, PipelineResult, StepError};
use super::step::PipelineStep;
use super::types::{Context, ProjectState};

/// Pipeline that runs a sequence of steps.
///
/// Steps execute in order, with validation before and after each one.
/// The first failure aborts the run; there are no retries.
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run the pipeline with the given context and state.
    ///
    /// Executes each step in order:
    /// 1. Run `validate_input`
    /// 2. Run `execute`
    /// 3. Run `validate_output`
    pub fn run(&self, ctx: &Context, state: &mut ProjectState) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult {
            steps_completed: Vec::new(),
        };

        let total_steps = self.steps.len();
        let project_name = ctx.project.name.clone();

        for (i, step) in self.steps.iter().enumerate() {
            let step_name = step.name();
            ctx.logger.phase(step_name);

            let percent = ((i as f64 / total_steps as f64) * 100.0) as u32;
            ctx.logger.progress(percent);

            ctx.logger
                .debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx, state) {
                ctx.logger.error(&format!("Input validation failed: {}", e));
                return Err(PipelineError::step_failed(&project_name, step_name, e));
            }

            ctx.logger.debug(&format!("Executing '{}'", step_name));
            step.execute(ctx, state).map_err(|e| {
                ctx.logger.error(&format!("Execution failed: {}", e));
                // A tool failure carries captured stderr; replay it so the
                // log ends with the lines that explain the exit code.
                if let StepError::Media(MediaError::CommandFailed { message, .. }) = &e {
                    for line in message.lines() {
                        ctx.logger.output_line(line, true);
                    }
                }
                ctx.logger.show_tail(step_name);
                PipelineError::step_failed(&project_name, step_name, e)
            })?;

            ctx.logger
                .debug(&format!("Validating output for '{}'", step_name));
            if let Err(e) = step.validate_output(ctx, state) {
                ctx.logger.error(&format!("Output validation failed: {}", e));
                return Err(PipelineError::step_failed(&project_name, step_name, e));
            }

            ctx.logger.success(&format!("{} completed", step_name));
            result.steps_completed.push(step_name.to_string());
        }

        ctx.logger.progress(100);
        ctx.logger.success("Pipeline completed successfully");

        Ok(result)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    /// Steps that completed successfully, in order.
    pub steps_completed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logging::{LogConfig, ProjectLogger};
    use crate::models::ProjectSpec;
    use crate::orchestrator::errors::{StepError, StepResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingStep {
        name: &'static str,
        execute_count: Arc<AtomicUsize>,
        fail: bool,
    }

    impl PipelineStep for CountingStep {
        fn name(&self) -> &str {
            self.name
        }

        fn validate_input(&self, _ctx: &Context, _state: &ProjectState) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut ProjectState) -> StepResult<()> {
            self.execute_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(StepError::invalid_input("forced failure"))
            } else {
                Ok(())
            }
        }

        fn validate_output(&self, _ctx: &Context, _state: &ProjectState) -> StepResult<()> {
            Ok(())
        }
    }

    fn test_context(dir: &std::path::Path) -> Context {
        let logger = Arc::new(
            ProjectLogger::new("pipeline_test", dir, LogConfig::default(), None).unwrap(),
        );
        Context::new(
            ProjectSpec::new("pipeline_test", "http://v", "http://a"),
            Settings::default(),
            dir.to_path_buf(),
            dir.to_path_buf(),
            logger,
        )
    }

    #[test]
    fn pipeline_builds_correctly() {
        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                name: "Step1",
                execute_count: Arc::new(AtomicUsize::new(0)),
                fail: false,
            })
            .with_step(CountingStep {
                name: "Step2",
                execute_count: Arc::new(AtomicUsize::new(0)),
                fail: false,
            });

        assert_eq!(pipeline.step_count(), 2);
        assert_eq!(pipeline.step_names(), vec!["Step1", "Step2"]);
    }

    #[test]
    fn pipeline_runs_steps_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let count1 = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::new(AtomicUsize::new(0));

        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                name: "Step1",
                execute_count: count1.clone(),
                fail: false,
            })
            .with_step(CountingStep {
                name: "Step2",
                execute_count: count2.clone(),
                fail: false,
            });

        let ctx = test_context(dir.path());
        let mut state = ProjectState::new();
        let result = pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(count1.load(Ordering::SeqCst), 1);
        assert_eq!(count2.load(Ordering::SeqCst), 1);
        assert_eq!(result.steps_completed, vec!["Step1", "Step2"]);
    }

    struct FailingToolStep;

    impl PipelineStep for FailingToolStep {
        fn name(&self) -> &str {
            "Retempo"
        }

        fn validate_input(&self, _ctx: &Context, _state: &ProjectState) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut ProjectState) -> StepResult<()> {
            Err(StepError::Media(MediaError::CommandFailed {
                tool: "ffmpeg".to_string(),
                exit_code: 1,
                message: "Invalid argument\nConversion failed!".to_string(),
            }))
        }

        fn validate_output(&self, _ctx: &Context, _state: &ProjectState) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn tool_failure_lands_stderr_in_the_log_tail() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new().with_step(FailingToolStep);

        let ctx = test_context(dir.path());
        let mut state = ProjectState::new();
        pipeline.run(&ctx, &mut state).unwrap_err();
        ctx.logger.flush();

        let content = std::fs::read_to_string(ctx.logger.log_path()).unwrap();
        assert!(content.contains("[Retempo/tail]"));
        assert!(content.contains("Conversion failed!"));
    }

    #[test]
    fn pipeline_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let count_after = Arc::new(AtomicUsize::new(0));

        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                name: "Failing",
                execute_count: Arc::new(AtomicUsize::new(0)),
                fail: true,
            })
            .with_step(CountingStep {
                name: "Never",
                execute_count: count_after.clone(),
                fail: false,
            });

        let ctx = test_context(dir.path());
        let mut state = ProjectState::new();
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        assert_eq!(count_after.load(Ordering::SeqCst), 0);
        match err {
            PipelineError::StepFailed { step_name, .. } => assert_eq!(step_name, "Failing"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
