//! Tempo reconciliation and beat alignment.
//!
//! This is the heart of the pipeline: given two tracks with independently
//! measured tempos and beat grids, decide whether they are compatible,
//! compute the shared target tempo and per-track stretch factors, and align
//! the post-stretch beat grids into one playback window.
//!
//! All operations here are pure; stretching and cutting are delegated to
//! the media collaborators.

mod align;
mod clip;
mod gate;
mod reconcile;
mod types;

pub use align::align;
pub use clip::final_clip;
pub use gate::{check_compatible, DEFAULT_TEMPO_TOLERANCE};
pub use reconcile::reconcile;
pub use types::{
    AlignmentPlan, ClipSpec, ReconciliationPlan, SyncError, SyncResult, TempoComparison,
};
