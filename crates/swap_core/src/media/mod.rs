//! External media collaborators: fetch, time-stretch, mux.
//!
//! Thin wrappers around yt-dlp and ffmpeg. Each capability sits behind a
//! trait so the orchestrator steps can be exercised with mocks; the real
//! implementations shell out, log the command, and map failures into
//! [`MediaError`].

mod fetch;
mod mux;
mod stretch;

use std::io;
use std::path::PathBuf;
use std::process::{Command, Output};

use thiserror::Error;

use crate::models::UnsupportedExtension;

pub use fetch::{FetchedMedia, MediaFetcher, YtDlpFetcher};
pub use mux::{FfmpegMuxer, Muxer};
pub use stretch::{FfmpegStretcher, TimeStretcher};

/// Errors from external media tools.
#[derive(Error, Debug)]
pub enum MediaError {
    /// A URL could not be resolved into a playable stream.
    #[error("Source unavailable: {url}: {message}")]
    SourceUnavailable { url: String, message: String },

    /// An external command exited non-zero.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// A command succeeded but the promised output file is absent.
    #[error("Expected output file missing: {0}")]
    OutputMissing(PathBuf),

    /// Tool output could not be parsed.
    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// A stretch factor outside the usable range.
    #[error("Invalid stretch factor: {0}")]
    InvalidStretchFactor(f64),

    /// The downloaded file has an extension no decoder handles.
    #[error(transparent)]
    UnsupportedExtension(#[from] UnsupportedExtension),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Run an external tool, mapping spawn failures and non-zero exits.
pub(crate) fn run_tool(tool: &str, cmd: &mut Command) -> MediaResult<Output> {
    tracing::debug!("Running {}: {:?}", tool, cmd);

    let output = cmd.output().map_err(|e| MediaError::Io {
        operation: format!("executing {}", tool),
        source: e,
    })?;

    if !output.status.success() {
        return Err(MediaError::CommandFailed {
            tool: tool.to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            message: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(output)
}
