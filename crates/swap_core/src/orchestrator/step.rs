//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, ProjectState};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step recorded valid output
pub trait PipelineStep: Send + Sync {
    /// Step name, used in logging and error context.
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    ///
    /// Should check that all required preconditions are met (earlier steps
    /// recorded their output, files exist, etc.).
    fn validate_input(&self, ctx: &Context, state: &ProjectState) -> StepResult<()>;

    /// Execute the step's main work.
    ///
    /// Performs the step's processing and records results in `state`.
    /// Use `ctx.logger` for logging and progress reporting.
    fn execute(&self, ctx: &Context, state: &mut ProjectState) -> StepResult<()>;

    /// Validate outputs after execution.
    ///
    /// Called after `execute` succeeds. Should verify that the step
    /// produced valid output (files exist, state populated, etc.).
    fn validate_output(&self, ctx: &Context, state: &ProjectState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
