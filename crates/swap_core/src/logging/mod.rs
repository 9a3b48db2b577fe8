//! Per-project logging.
//!
//! Global diagnostics go through `tracing`; the run-scoped record of a
//! project (phases, commands, tool output, progress) goes to its own log
//! file via [`ProjectLogger`], optionally mirrored to a callback.

mod project_logger;
mod types;

pub use project_logger::ProjectLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};
