//! Per-project logger.
//!
//! Every run writes its own log file and optionally echoes each line to a
//! callback sink (console, tests). Compact mode filters progress noise and
//! diverts external-tool output into a bounded tail buffer, replayed when a
//! tool fails so the log ends with the lines that matter.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-project logger writing to a file and an optional callback sink.
pub struct ProjectLogger {
    project_name: String,
    log_path: PathBuf,
    file_writer: Arc<Mutex<Option<BufWriter<File>>>>,
    callback: Arc<Mutex<Option<LogCallback>>>,
    config: LogConfig,
    /// Bounded buffer of recent tool-output lines.
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
    /// Last progress value logged, for compact-mode filtering.
    last_progress: Arc<Mutex<u32>>,
}

impl ProjectLogger {
    /// Create a logger writing to `<log_dir>/<project_name>.log`.
    pub fn new(
        project_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let project_name = project_name.into();
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&project_name)));
        let file_writer = BufWriter::new(File::create(&log_path)?);

        Ok(Self {
            project_name,
            log_path,
            file_writer: Arc::new(Mutex::new(Some(file_writer))),
            callback: Arc::new(Mutex::new(callback)),
            config,
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(100))),
            last_progress: Arc::new(Mutex::new(0)),
        })
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at the given level; anything below the configured
    /// floor is dropped.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }
        self.emit(&self.stamp(message));
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        let msg = MessagePrefix::Command.format(command);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        let msg = MessagePrefix::Section.format(section_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a progress update; returns false when compact mode filtered it.
    ///
    /// Compact mode only logs when a new `progress_step` interval is
    /// crossed, plus the final 100%.
    pub fn progress(&self, percent: u32) -> bool {
        if self.config.compact {
            let mut last = self.last_progress.lock();
            let step = self.config.progress_step.max(1);

            let current_step = (percent / step) * step;
            let last_step = (*last / step) * step;

            if current_step <= last_step && percent < 100 {
                return false;
            }
            *last = percent;
        }

        self.log(LogLevel::Info, &format!("Progress: {}%", percent));
        true
    }

    /// Record a stdout/stderr line from an external tool.
    ///
    /// The line always lands in the tail buffer; compact mode keeps it out
    /// of the live log until [`show_tail`](Self::show_tail) replays it.
    pub fn output_line(&self, line: &str, is_stderr: bool) {
        {
            let mut buffer = self.tail_buffer.lock();
            if buffer.len() >= self.config.error_tail {
                buffer.pop_front();
            }
            buffer.push_back(line.to_string());
        }

        if self.config.compact {
            return;
        }

        let prefix = if is_stderr { "[stderr] " } else { "" };
        self.emit(&self.stamp(&format!("{}{}", prefix, line)));
    }

    /// Replay the tail buffer under a header, typically after a tool error.
    pub fn show_tail(&self, header: &str) {
        let buffer = self.tail_buffer.lock();
        if buffer.is_empty() {
            return;
        }

        self.emit(&self.stamp(&format!("[{}/tail]", header)));
        for line in buffer.iter() {
            self.emit(&self.stamp(line));
        }
    }

    /// Snapshot of the current tail buffer.
    pub fn tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush buffered log output to disk.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Flush and drop the file handle; later lines reach only the callback.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Prepend a wall-clock timestamp when configured.
    fn stamp(&self, message: &str) -> String {
        if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        }
    }

    /// Write one formatted line to the file and the callback sink.
    fn emit(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref callback) = *self.callback.lock() {
            callback(formatted);
        }
    }
}

impl Drop for ProjectLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Replace path-hostile characters so a project name works as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
