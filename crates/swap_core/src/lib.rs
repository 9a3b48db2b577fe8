//! Swap Core - backend logic for songswap.
//!
//! Replaces the audio track of one video with tempo-matched audio from
//! another source, aligning the two by musical beat rather than wall-clock
//! time. All business logic lives here with zero UI dependencies; the CLI
//! is a thin caller.

pub mod analysis;
pub mod config;
pub mod logging;
pub mod media;
pub mod models;
pub mod orchestrator;
pub mod sync;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
