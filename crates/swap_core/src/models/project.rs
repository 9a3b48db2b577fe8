//! Project specification supplied by the caller.

use serde::{Deserialize, Serialize};

/// Everything the caller provides to start a run.
///
/// The project name determines the working directory and the final artifact
/// name; no two in-flight runs may share a name (coordination is external,
/// the pipeline itself takes no locks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Name of the project; names the work dir and the final
    /// `<outputs-root>/<name>.mp4`.
    pub name: String,
    /// URL of the video whose audio will be replaced.
    pub video_url: String,
    /// URL of the source providing the replacement audio.
    pub audio_url: String,
    /// Optional tempo tolerance override; falls back to settings when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo_tolerance: Option<f64>,
}

impl ProjectSpec {
    /// Create a spec with the default tolerance.
    pub fn new(
        name: impl Into<String>,
        video_url: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            video_url: video_url.into(),
            audio_url: audio_url.into(),
            tempo_tolerance: None,
        }
    }

    /// Set a tolerance override.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tempo_tolerance = Some(tolerance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_defaults_to_none() {
        let spec = ProjectSpec::new("demo", "http://v", "http://a");
        assert!(spec.tempo_tolerance.is_none());

        let spec = spec.with_tolerance(0.35);
        assert_eq!(spec.tempo_tolerance, Some(0.35));
    }
}
