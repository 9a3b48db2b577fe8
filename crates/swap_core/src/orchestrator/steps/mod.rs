//! Pipeline step implementations.
//!
//! Steps run in this order: Fetch, Ingest, TempoGate, Stretch, Align, Mux.

mod align;
mod fetch;
mod ingest;
mod mux;
mod stretch;
mod tempo_gate;

pub use align::AlignStep;
pub use fetch::FetchStep;
pub use ingest::IngestStep;
pub use mux::MuxStep;
pub use stretch::StretchStep;
pub use tempo_gate::TempoGateStep;
