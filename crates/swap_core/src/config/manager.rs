//! Config loading, saving, and section-level updates.
//!
//! Writes are atomic (temp file in the same directory, then rename) and a
//! section update round-trips the rest of the file through toml_edit, so
//! hand-written comments in other sections survive.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParse(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the settings file and the in-memory [`Settings`] it maps to.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Point a manager at a settings file without touching disk.
    ///
    /// Call `load()` or `load_or_create()` to populate it.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable settings; in memory only until `save()` or
    /// `update_section()`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load settings from disk; `NotFound` when the file is absent.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load settings, writing a default file first when none exists.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            self.load()?;
        } else {
            if let Some(parent) = self.config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Create the configured output and log directories if missing.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        for dir in [
            &self.settings.paths.outputs_root,
            &self.settings.paths.logs_folder,
        ] {
            let path = PathBuf::from(dir);
            if !path.exists() {
                fs::create_dir_all(&path)?;
            }
        }

        Ok(())
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Rewrite one section from the in-memory settings, leaving the rest of
    /// the on-disk file untouched, comments included.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_toml = match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
            ConfigSection::Analysis => toml::to_string_pretty(&self.settings.analysis)?,
            ConfigSection::Tools => toml::to_string_pretty(&self.settings.tools)?,
        };

        let section_doc: DocumentMut = section_toml.parse()?;
        let section_table = section_doc.as_table().clone();

        doc[section.table_name()] = Item::Table(section_table);

        self.atomic_write(&doc.to_string())?;

        Ok(())
    }

    /// Generate config content with helpful comments.
    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let sections: [(&str, &str, String); 4] = [
            (
                "Output and log directories",
                "[paths]",
                toml::to_string_pretty(&self.settings.paths)?,
            ),
            (
                "Logging configuration",
                "[logging]",
                toml::to_string_pretty(&self.settings.logging)?,
            ),
            (
                "Tempo analysis settings",
                "[analysis]",
                toml::to_string_pretty(&self.settings.analysis)?,
            ),
            (
                "External tool locations",
                "[tools]",
                toml::to_string_pretty(&self.settings.tools)?,
            ),
        ];

        let mut output = String::new();
        output.push_str("# songswap configuration\n");
        output.push_str("# This file is auto-generated; section updates preserve comments.\n\n");

        for (comment, header, body) in sections {
            output.push_str(&format!("# {}\n{}\n", comment, header));
            for line in body.lines() {
                output.push_str(line);
                output.push('\n');
            }
            output.push('\n');
        }

        Ok(output)
    }

    /// Temp file in the same directory, sync, then rename over the target.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}
