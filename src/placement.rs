//! Placement planning and execution.
//!
//! Each topic maps to a folder under the sorted root named after its title.
//! Topics sharing a title share the folder.
//!
//! # De-duplication
//!
//! There is no ledger of placed files: a file counts as placed when its
//! destination exists. The check uses the name the file will have *after*
//! transcoding, because an `a.opus` placed by an earlier run is by now
//! `a.wav`. Checking the original name instead would move the file again on
//! every run.
//!
//! The move itself keeps the original name; transcoding happens afterwards.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatsort::collab::FsMover;
//! use chatsort::placement::{Conversion, Planner, execute};
//! # use chatsort::grouping::TopicGroup;
//! # let topics: Vec<TopicGroup> = vec![];
//!
//! let planner = Planner::new(Conversion::new(["opus", "ogg"], "wav"));
//! let plan = planner.plan(&topics, "profe/sorted".as_ref());
//! let report = execute(&plan.records, &FsMover, false)?;
//! println!("moved {} files", report.moved);
//! # Ok::<(), chatsort::SortError>(())
//! ```

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collab::FileMover;
use crate::error::{Result, SortError};
use crate::grouping::{SEPARATOR_PLACEHOLDER, TopicGroup, sanitize_title};

/// Which extensions get transcoded, and into what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    from: Vec<String>,
    to: String,
}

impl Conversion {
    /// `from` and `to` are extensions with or without the leading dot.
    pub fn new<'a>(from: impl IntoIterator<Item = &'a str>, to: &str) -> Self {
        Self {
            from: from
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            to: to.trim_start_matches('.').to_string(),
        }
    }

    /// A policy under which nothing is convertible.
    pub fn none() -> Self {
        Self {
            from: Vec::new(),
            to: String::new(),
        }
    }

    /// Extension produced by the transcoder.
    pub fn target_extension(&self) -> &str {
        &self.to
    }

    /// Returns `true` if `path` has a convertible extension (case-insensitive).
    pub fn is_convertible(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.from.iter().any(|f| f.eq_ignore_ascii_case(ext)))
    }

    /// Name `file_name` will carry once transcoding has run.
    pub fn final_name(&self, file_name: &OsStr) -> PathBuf {
        let name = Path::new(file_name);
        if self.is_convertible(name) {
            name.with_extension(&self.to)
        } else {
            name.to_path_buf()
        }
    }
}

impl Default for Conversion {
    fn default() -> Self {
        Self::new(["opus", "ogg"], "wav")
    }
}

/// Longest folder name most filesystems accept, in bytes.
pub const MAX_FOLDER_BYTES: usize = 255;

/// Folder name for a topic title.
///
/// Path separators are replaced, and titles made only of dots or whitespace
/// are replaced character by character so the folder stays inside the root.
/// Names longer than [`MAX_FOLDER_BYTES`] are cut on a char boundary, then
/// stripped of trailing whitespace and dots.
pub fn folder_name(title: &str) -> String {
    let name: String = sanitize_title(title)
        .chars()
        .map(|c| if c == '\0' { SEPARATOR_PLACEHOLDER } else { c })
        .collect();

    if name.trim().is_empty() {
        return SEPARATOR_PLACEHOLDER.to_string();
    }
    if name.chars().all(|c| c == '.') {
        return name.chars().map(|_| SEPARATOR_PLACEHOLDER).collect();
    }
    if name.len() <= MAX_FOLDER_BYTES {
        return name;
    }

    let mut cut = MAX_FOLDER_BYTES;
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    let trimmed = name[..cut].trim_end_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.is_empty() {
        SEPARATOR_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Move `source` into `folder`, keeping `file_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementRecord {
    pub source: PathBuf,
    pub folder: PathBuf,
    pub file_name: PathBuf,
}

impl PlacementRecord {
    /// Where the file lands.
    pub fn destination(&self) -> PathBuf {
        self.folder.join(&self.file_name)
    }
}

/// Records to execute plus what was skipped as already placed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub records: Vec<PlacementRecord>,
    pub skipped: usize,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decides which attachments still need moving, and where.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    conversion: Conversion,
}

impl Planner {
    pub fn new(conversion: Conversion) -> Self {
        Self { conversion }
    }

    /// Plans the moves for `topics` under `sorted_root`.
    ///
    /// Reads the filesystem but changes nothing.
    pub fn plan(&self, topics: &[TopicGroup], sorted_root: &Path) -> Plan {
        let mut plan = Plan::default();
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        for topic in topics {
            let folder = sorted_root.join(folder_name(&topic.title));

            for source in &topic.attachments {
                let Some(file_name) = source.file_name() else {
                    debug!(source = %source.display(), "attachment without a file name, skipped");
                    plan.skipped += 1;
                    continue;
                };

                let final_path = folder.join(self.conversion.final_name(file_name));
                if final_path.exists() || !claimed.insert(final_path.clone()) {
                    debug!(file = %final_path.display(), "already placed");
                    plan.skipped += 1;
                    continue;
                }

                plan.records.push(PlacementRecord {
                    source: source.clone(),
                    folder: folder.clone(),
                    file_name: PathBuf::from(file_name),
                });
            }
        }
        plan
    }
}

/// Outcome of executing a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlacementReport {
    /// Files moved into topic folders.
    pub moved: usize,
    /// Sources that no longer existed.
    pub stale: usize,
    /// Destinations already holding the original-name file.
    pub already_present: usize,
    /// Records skipped because their folder could not be created.
    pub failed: usize,
    /// Folders created.
    pub folders_created: usize,
    /// Nothing was touched.
    pub dry_run: bool,
}

/// Executes `records` in order through `mover`.
///
/// Missing sources and folders that cannot be created are reported and
/// skipped. Any other I/O failure aborts.
pub fn execute(
    records: &[PlacementRecord],
    mover: &dyn FileMover,
    dry_run: bool,
) -> Result<PlacementReport> {
    let mut report = PlacementReport {
        dry_run,
        ..PlacementReport::default()
    };

    for record in records {
        if record.destination().exists() {
            debug!(file = %record.destination().display(), "original already in place");
            report.already_present += 1;
            continue;
        }

        if dry_run {
            info!(from = %record.source.display(), to = %record.folder.display(), "would move");
            report.moved += 1;
            continue;
        }

        if !record.folder.is_dir() {
            if let Err(e) = fs::create_dir_all(&record.folder) {
                report.failed += 1;
                warn!(folder = %record.folder.display(), error = %e, "cannot create folder, skipped");
                continue;
            }
            report.folders_created += 1;
        }

        match mover.move_into(&record.source, &record.folder) {
            Ok(target) => {
                report.moved += 1;
                info!(from = %record.source.display(), to = %target.display(), "moved");
            }
            Err(SortError::StaleSource { path }) => {
                report.stale += 1;
                warn!(source = %path.display(), "source already gone, skipped");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}
