//! Export bundle collection and extraction.
//!
//! Exports arrive as zip bundles in a download directory. They are moved into
//! the work directory and unpacked into the staging directory on every run.
//! Extraction overwrites whatever is already staged.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::collab::mover::{FileMover, FsMover};
use crate::error::{Result, SortError};

/// Files directly inside `dir` whose name matches `pattern`, sorted.
pub fn find_bundles(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let paths = glob::glob(&full).map_err(|source| SortError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut bundles: Vec<PathBuf> = paths
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    bundles.sort();
    Ok(bundles)
}

/// Moves every bundle matching `pattern` from `source_dir` into `work_dir`.
///
/// # Errors
///
/// [`SortError::MissingInput`] if `source_dir` is absent or holds no bundle.
pub fn collect_bundles(source_dir: &Path, pattern: &str, work_dir: &Path) -> Result<Vec<PathBuf>> {
    if !source_dir.is_dir() {
        return Err(SortError::missing("source directory", source_dir));
    }

    let bundles = find_bundles(source_dir, pattern)?;
    if bundles.is_empty() {
        return Err(SortError::missing("export bundle", source_dir.join(pattern)));
    }

    fs::create_dir_all(work_dir)?;
    let mut moved = Vec::with_capacity(bundles.len());
    for bundle in bundles {
        let target = FsMover.move_into(&bundle, work_dir)?;
        info!(from = %bundle.display(), to = %target.display(), "bundle collected");
        moved.push(target);
    }
    Ok(moved)
}

/// Unpacks one zip bundle into `staging`, returning the number of files written.
///
/// Entries whose path would leave `staging` are skipped.
pub fn extract_bundle(bundle: &Path, staging: &Path) -> Result<usize> {
    let file = File::open(bundle)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| SortError::Archive {
        path: bundle.to_path_buf(),
        source,
    })?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|source| SortError::Archive {
            path: bundle.to_path_buf(),
            source,
        })?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(bundle = %bundle.display(), entry = entry.name(), "unsafe entry path, skipped");
            continue;
        };
        let target = staging.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        written += 1;
    }
    Ok(written)
}

/// Unpacks every bundle matching `pattern` in `work_dir` into `staging`.
pub fn extract_all(work_dir: &Path, pattern: &str, staging: &Path) -> Result<usize> {
    fs::create_dir_all(staging)?;
    let mut total = 0;
    for bundle in find_bundles(work_dir, pattern)? {
        let count = extract_bundle(&bundle, staging)?;
        info!(bundle = %bundle.display(), files = count, "bundle extracted");
        total += count;
    }
    Ok(total)
}
