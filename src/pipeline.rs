//! One complete sorting run.
//!
//! ```text
//! collect + extract bundles ─▶ read log ─▶ load state ─▶ group new lines
//!        ─▶ save state ─▶ plan placement ─▶ move files ─▶ transcode audio
//! ```
//!
//! State is saved once, after grouping and before any file moves. A crash
//! during placement therefore leaves lines marked as consumed; the next run
//! re-plans every persisted topic and skips whatever already landed.
//!
//! Runs are not locked against each other. Run one process at a time.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::collab::{ConversionReport, FileMover, Transcoder, convert_pending};
use crate::config::SortConfig;
use crate::error::{Result, SortError};
use crate::grouping::{GroupingStats, TopicGrouper};
use crate::placement::{PlacementReport, Planner, execute};
use crate::state::StateStore;

/// Switches for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Collect bundles from the source dir and unpack them first.
    pub extract: bool,
    /// Transcode convertible audio after placement.
    pub convert: bool,
    /// Plan and log only: no bundle moves, no state write, no file moves.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            extract: cfg!(feature = "archive"),
            convert: true,
            dry_run: false,
        }
    }
}

/// Counters from a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Bundles collected from the source directory.
    pub bundles: usize,
    /// Files unpacked into the staging directory.
    pub extracted: usize,
    /// Lines in the transcript.
    pub total_lines: usize,
    pub grouping: GroupingStats,
    /// Topics persisted after this run.
    pub topics: usize,
    /// Attachments skipped as already placed.
    pub already_placed: usize,
    pub placement: PlacementReport,
    pub conversion: Option<ConversionReport>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The transcript has no lines past the resume index; nothing was done.
    NoNewData {
        last_line_index: usize,
        total_lines: usize,
    },
    Completed(RunReport),
}

/// Reads the transcript as lines, failing with `MissingInput` if absent.
pub fn read_log(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(SortError::missing("chat log", path));
    }
    let raw = fs::read_to_string(path)?;
    Ok(raw.lines().map(str::to_string).collect())
}

/// Executes one run with the given collaborators.
pub fn run(
    config: &SortConfig,
    options: RunOptions,
    mover: &dyn FileMover,
    transcoder: &dyn Transcoder,
) -> Result<RunOutcome> {
    let mut report = RunReport::default();

    if options.extract && !options.dry_run {
        let (bundles, extracted) = stage_bundles(config)?;
        report.bundles = bundles;
        report.extracted = extracted;
    }

    let log = read_log(&config.chat_log_path())?;
    report.total_lines = log.len();

    let store = StateStore::new(&config.state_file, config.start_line);
    let prior = store.load()?;
    if !prior.has_new_lines(log.len()) {
        info!(
            last_line = prior.last_line_index,
            total = log.len(),
            "no new lines to parse"
        );
        return Ok(RunOutcome::NoNewData {
            last_line_index: prior.last_line_index,
            total_lines: log.len(),
        });
    }

    let grouper = TopicGrouper::new(config.staging_path());
    let extension = grouper.extend(&prior, &log);
    report.grouping = extension.stats;
    report.topics = extension.state.topics.len();
    info!(
        from = prior.last_line_index,
        to = extension.state.last_line_index,
        topics = report.topics,
        "transcript grouped"
    );

    if !options.dry_run {
        store.save(&extension.state)?;
    }

    let sorted_root = config.sorted_path();
    let plan = Planner::new(config.conversion()).plan(&extension.state.topics, &sorted_root);
    report.already_placed = plan.skipped;
    report.placement = execute(&plan.records, mover, options.dry_run)?;

    if options.convert && !options.dry_run {
        report.conversion = Some(convert_pending(&sorted_root, &config.conversion(), transcoder)?);
    }

    Ok(RunOutcome::Completed(report))
}

#[cfg(feature = "archive")]
fn stage_bundles(config: &SortConfig) -> Result<(usize, usize)> {
    use crate::collab::archive::{collect_bundles, extract_all};

    let bundles = collect_bundles(&config.source_dir, &config.bundle_pattern, &config.work_dir)?;
    let extracted = extract_all(&config.work_dir, &config.bundle_pattern, &config.staging_path())?;
    Ok((bundles.len(), extracted))
}

#[cfg(not(feature = "archive"))]
fn stage_bundles(_config: &SortConfig) -> Result<(usize, usize)> {
    tracing::warn!("built without the `archive` feature, using the staged transcript as is");
    Ok((0, 0))
}
