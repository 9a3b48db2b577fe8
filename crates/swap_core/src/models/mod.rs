//! Data models shared across the pipeline.

mod enums;
mod project;

pub use enums::{MediaKind, SourceRole, UnsupportedExtension};
pub use project::ProjectSpec;
