//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::analysis::DEFAULT_SAMPLE_RATE;
use crate::sync::DEFAULT_TEMPO_TOLERANCE;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Tempo analysis settings.
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,
}

/// Path configuration for outputs and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder holding one working directory per project.
    #[serde(default = "default_outputs_root")]
    pub outputs_root: String,

    /// Folder for per-project log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_outputs_root() -> String {
    "songswap_outputs".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            outputs_root: default_outputs_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of buffered tool-output lines shown after an error.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Show timestamps in log output.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

/// Tempo analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Sample rate audio is decoded to before onset analysis.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Relative tempo difference allowed between the two sources.
    #[serde(default = "default_tempo_tolerance")]
    pub tempo_tolerance: f64,
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_tempo_tolerance() -> f64 {
    DEFAULT_TEMPO_TOLERANCE
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            tempo_tolerance: default_tempo_tolerance(),
        }
    }
}

/// External tool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// ffmpeg executable.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// ffprobe executable.
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,

    /// yt-dlp executable.
    #[serde(default = "default_ytdlp")]
    pub ytdlp: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_ytdlp() -> String {
    "yt-dlp".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            ytdlp: default_ytdlp(),
        }
    }
}

/// Identifies a settings section for atomic section-level updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Logging,
    Analysis,
    Tools,
}

impl ConfigSection {
    /// TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Analysis => "analysis",
            ConfigSection::Tools => "tools",
        }
    }
}
