//! Core enums used throughout the application.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A file extension that no decoder in this pipeline understands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot infer media kind from extension: '{0}'")]
pub struct UnsupportedExtension(pub String);

/// Container kind of an ingested media file.
///
/// Resolved exactly once when a file enters the pipeline; downstream code
/// dispatches on the variant, never on path suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Wav,
    Mp3,
    Mp4,
}

impl MediaKind {
    /// Resolve the media kind from a file path.
    pub fn from_path(path: &Path) -> Result<Self, UnsupportedExtension> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "wav" => Ok(MediaKind::Wav),
            "mp3" => Ok(MediaKind::Mp3),
            "mp4" | "m4a" => Ok(MediaKind::Mp4),
            other => Err(UnsupportedExtension(other.to_string())),
        }
    }

    /// Whether this kind carries audio only (no video stream).
    pub fn is_audio_only(&self) -> bool {
        matches!(self, MediaKind::Wav | MediaKind::Mp3)
    }

    /// Canonical file extension for this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Wav => "wav",
            MediaKind::Mp3 => "mp3",
            MediaKind::Mp4 => "mp4",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Which of the two input sources a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    /// The video whose audio is being replaced.
    Base,
    /// The source providing the replacement audio.
    Replacement,
}

impl std::fmt::Display for SourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRole::Base => write!(f, "base"),
            SourceRole::Replacement => write!(f, "replacement"),
        }
    }
}
