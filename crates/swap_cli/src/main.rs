//! Command-line entry point for songswap.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use swap_core::config::ConfigManager;
use swap_core::logging::{LogConfig, LogLevel, ProjectLogger};
use swap_core::models::ProjectSpec;
use swap_core::orchestrator::{create_standard_pipeline, ProjectRunner};

/// Replace a video's audio with beat-aligned audio from another source.
#[derive(Parser, Debug)]
#[command(name = "songswap", version, about)]
struct Cli {
    /// Project name; names the working directory and the final file.
    project_name: String,

    /// URL of the base video.
    video_url: String,

    /// URL of the replacement audio.
    audio_url: String,

    /// Relative tempo tolerance override (default from config).
    #[arg(long)]
    tolerance: Option<f64>,

    /// Config file path.
    #[arg(long, default_value = "songswap.toml")]
    config: PathBuf,

    /// Log every tool-output line instead of the compact summary.
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    config.ensure_dirs_exist().context("creating directories")?;
    tracing::debug!("Config loaded from {}", config.path().display());

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig {
            level: LogLevel::Info,
            compact: config.settings().logging.compact,
            progress_step: config.settings().logging.progress_step,
            error_tail: config.settings().logging.error_tail as usize,
            show_timestamps: config.settings().logging.show_timestamps,
        }
    };

    let logger = Arc::new(
        ProjectLogger::new(
            &cli.project_name,
            config.logs_folder(),
            log_config,
            Some(Box::new(|line| println!("{}", line))),
        )
        .context("opening project log")?,
    );

    let mut project = ProjectSpec::new(&cli.project_name, &cli.video_url, &cli.audio_url);
    if let Some(tolerance) = cli.tolerance {
        project = project.with_tolerance(tolerance);
    }

    let settings = config.settings().clone();
    let pipeline = create_standard_pipeline(&settings);
    let runner = ProjectRunner::new(settings);

    let output = runner.run(project, logger, &pipeline)?;
    println!("{}", output.display());

    Ok(())
}
