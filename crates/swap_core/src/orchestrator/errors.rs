//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Project → Step → Operation → Detail

use std::io;

use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::media::MediaError;
use crate::sync::SyncError;

/// Top-level pipeline error with project context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Project '{project_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        project_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Failed to set up the project run (create directories, open logs).
    #[error("Project '{project_name}' setup failed: {message}")]
    SetupFailed {
        project_name: String,
        message: String,
    },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        project_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            project_name: project_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(project_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            project_name: project_name.into(),
            message: message.into(),
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// Tempo comparison or alignment failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Audio decode or beat estimation failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// An external tool failed.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
