//! Configuration for a sorting run.
//!
//! [`SortConfig`] holds every path and policy knob the pipeline needs. It can
//! be built in code with the `with_*` builders or loaded from a TOML file;
//! every field has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```rust
//! use chatsort::config::SortConfig;
//!
//! let config = SortConfig::new()
//!     .with_work_dir("lectures")
//!     .with_start_line(0);
//!
//! assert_eq!(config.chat_log_path(), std::path::Path::new("lectures/.dump/_chat.txt"));
//! ```
//!
//! # File format
//!
//! ```toml
//! source_dir = "/home/me/Downloads"
//! bundle_pattern = "*profe.zip"
//! work_dir = "profe"
//! convertible_extensions = ["opus", "ogg"]
//! converted_extension = "wav"
//! log_level = "debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SortError};

/// Line index at which a fresh export's message body starts.
///
/// Exports open with a fixed header block; the first run skips it.
pub const DEFAULT_START_LINE: usize = 23;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "chatsort.toml";

/// Configuration for a sorting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Directory scanned for freshly exported bundles (default: `.`)
    pub source_dir: PathBuf,

    /// Glob matched against bundle file names (default: `*profe.zip`)
    pub bundle_pattern: String,

    /// Processing directory that receives the bundles (default: `profe`)
    pub work_dir: PathBuf,

    /// Extraction target, relative to `work_dir` unless absolute (default: `.dump`)
    pub staging_dir: PathBuf,

    /// Topic folders root, relative to `work_dir` unless absolute (default: `sorted`)
    pub sorted_dir: PathBuf,

    /// Transcript file name inside the staging dir (default: `_chat.txt`)
    pub chat_file: String,

    /// Resume state file (default: `chatsort-state.json`)
    pub state_file: PathBuf,

    /// Resume index used when no state exists yet (default: 23)
    pub start_line: usize,

    /// Audio containers that get transcoded after placement (default: opus, ogg)
    pub convertible_extensions: Vec<String>,

    /// Extension produced by the transcoder (default: `wav`)
    pub converted_extension: String,

    /// Transcoder executable (default: `ffmpeg`)
    pub transcoder: String,

    /// Transcriber executable (default: `whisper`)
    pub transcriber: String,

    /// Spoken language passed to the transcriber (default: `Spanish`)
    pub language: String,

    /// Default log filter when `RUST_LOG` is unset (default: `info`)
    pub log_level: String,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            bundle_pattern: "*profe.zip".to_string(),
            work_dir: PathBuf::from("profe"),
            staging_dir: PathBuf::from(".dump"),
            sorted_dir: PathBuf::from("sorted"),
            chat_file: "_chat.txt".to_string(),
            state_file: PathBuf::from("chatsort-state.json"),
            start_line: DEFAULT_START_LINE,
            convertible_extensions: vec!["opus".to_string(), "ogg".to_string()],
            converted_extension: "wav".to_string(),
            transcoder: "ffmpeg".to_string(),
            transcriber: "whisper".to_string(),
            language: "Spanish".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl SortConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a TOML file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SortError::missing("config file", path));
        }
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| SortError::config(Some(path.to_path_buf()), e.to_string()))?;
        config.validate(Some(path))?;
        Ok(config)
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self, path: Option<&Path>) -> Result<()> {
        if self.chat_file.trim().is_empty() {
            return Err(SortError::config(
                path.map(Path::to_path_buf),
                "chat_file must not be empty",
            ));
        }
        if self.converted_extension.trim_start_matches('.').is_empty() {
            return Err(SortError::config(
                path.map(Path::to_path_buf),
                "converted_extension must not be empty",
            ));
        }
        Ok(())
    }

    /// Sets the directory scanned for bundles.
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// Sets the bundle glob pattern.
    #[must_use]
    pub fn with_bundle_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.bundle_pattern = pattern.into();
        self
    }

    /// Sets the processing directory.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Sets the state file.
    #[must_use]
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    /// Sets the resume index used on a first run.
    #[must_use]
    pub fn with_start_line(mut self, line: usize) -> Self {
        self.start_line = line;
        self
    }

    /// Sets the extension predicted for transcoded audio.
    #[must_use]
    pub fn with_converted_extension(mut self, ext: impl Into<String>) -> Self {
        self.converted_extension = ext.into();
        self
    }

    /// Sets the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Extraction directory.
    pub fn staging_path(&self) -> PathBuf {
        self.work_dir.join(&self.staging_dir)
    }

    /// Root of the topic folders.
    pub fn sorted_path(&self) -> PathBuf {
        self.work_dir.join(&self.sorted_dir)
    }

    /// Full path of the transcript.
    pub fn chat_log_path(&self) -> PathBuf {
        self.staging_path().join(&self.chat_file)
    }

    /// Conversion policy derived from the extension settings.
    pub fn conversion(&self) -> crate::placement::Conversion {
        crate::placement::Conversion::new(
            self.convertible_extensions.iter().map(String::as_str),
            &self.converted_extension,
        )
    }
}
