//! Resume state persisted between runs.
//!
//! The state records how many transcript lines have been consumed and which
//! topics still hold attachments. It is written once per run, after grouping
//! and before any file is moved, and always replaces the previous state
//! wholesale.
//!
//! On disk it is pretty-printed JSON:
//!
//! ```json
//! {
//!   "last_line_index": 148,
//!   "topics": [
//!     {
//!       "title": "Normativa PSX",
//!       "attachments": ["profe/.dump/00000135-AUDIO-2023-10-04-17-00-22.opus"]
//!     }
//!   ]
//! }
//! ```
//!
//! The store takes no lock: runs against the same state file must be
//! serialized by the caller.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SortError};
use crate::grouping::TopicGroup;

/// Progress through the transcript plus the topics filed so far.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResumeState {
    /// Number of transcript lines already consumed.
    pub last_line_index: usize,
    /// Topics with at least one attachment, in first-seen order.
    #[serde(default)]
    pub topics: Vec<TopicGroup>,
}

impl ResumeState {
    /// A fresh state that will start reading at `line`.
    pub fn starting_at(line: usize) -> Self {
        Self {
            last_line_index: line,
            topics: Vec::new(),
        }
    }

    /// Returns `true` if a log of `total_lines` lines has unread lines.
    pub fn has_new_lines(&self, total_lines: usize) -> bool {
        self.last_line_index < total_lines
    }

    /// Total number of attachments across all topics.
    pub fn attachment_count(&self) -> usize {
        self.topics.iter().map(|t| t.attachments.len()).sum()
    }
}

/// Loads and saves [`ResumeState`] as a JSON file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    start_line: usize,
}

impl StateStore {
    /// Creates a store at `path`; a missing file means "start at `start_line`".
    pub fn new(path: impl Into<PathBuf>, start_line: usize) -> Self {
        Self {
            path: path.into(),
            start_line,
        }
    }

    /// The state file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if a state file has been written.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the persisted state, or a fresh one if none exists.
    pub fn load(&self) -> Result<ResumeState> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), start = self.start_line, "no resume state, starting fresh");
                return Ok(ResumeState::starting_at(self.start_line));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|e| SortError::state(&self.path, e))
    }

    /// Replaces the persisted state with `state`.
    ///
    /// Writes a sibling temp file and renames it over the target, so a crash
    /// mid-write leaves the previous state intact.
    pub fn save(&self, state: &ResumeState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json =
            serde_json::to_string_pretty(state).map_err(|e| SortError::state(&self.path, e))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(
            path = %self.path.display(),
            last_line = state.last_line_index,
            topics = state.topics.len(),
            "resume state saved"
        );
        Ok(())
    }
}
