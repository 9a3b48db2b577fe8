//! Application configuration.
//!
//! Settings live in a TOML file with one table per concern. The manager
//! handles defaults, atomic writes, and section-level updates.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    AnalysisSettings, ConfigSection, LoggingSettings, PathSettings, Settings, ToolSettings,
};
