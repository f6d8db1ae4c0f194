//! Audio transcoding of placed files.
//!
//! After placement, every convertible file under the sorted root is handed to
//! a [`Transcoder`], which writes a sibling with the converted extension. The
//! original is deleted only once the conversion succeeded.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SortError};
use crate::placement::Conversion;

/// Converts one audio file into a sibling with a different extension.
pub trait Transcoder {
    /// Writes the converted file next to `source` and returns its path.
    ///
    /// Does not delete `source`.
    fn convert(&self, source: &Path) -> Result<PathBuf>;
}

/// [`Transcoder`] that shells out to `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
    extension: String,
}

impl FfmpegTranscoder {
    /// Creates a transcoder producing `extension` files with `program`.
    pub fn new(program: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }
}

impl Transcoder for FfmpegTranscoder {
    fn convert(&self, source: &Path) -> Result<PathBuf> {
        let target = source.with_extension(&self.extension);
        let output = Command::new(&self.program)
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(source)
            .arg(&target)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SortError::command(&self.program, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SortError::command(
                &self.program,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }
        Ok(target)
    }
}

/// Outcome of a conversion sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub converted: usize,
    pub failed: usize,
}

/// Lists convertible files under `root`, sorted by path.
pub fn find_convertible(root: &Path, conversion: &Conversion) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| conversion.is_convertible(path))
        .collect();
    files.sort();
    files
}

/// Converts every convertible file under `root` and deletes the originals.
///
/// A failed conversion keeps its source and is counted; the sweep goes on.
pub fn convert_pending(
    root: &Path,
    conversion: &Conversion,
    transcoder: &dyn Transcoder,
) -> Result<ConversionReport> {
    let mut report = ConversionReport::default();
    if !root.is_dir() {
        return Ok(report);
    }

    for source in find_convertible(root, conversion) {
        match transcoder.convert(&source) {
            Ok(target) => {
                fs::remove_file(&source)?;
                report.converted += 1;
                info!(from = %source.display(), to = %target.display(), "converted");
            }
            Err(e) => {
                report.failed += 1;
                warn!(file = %source.display(), error = %e, "conversion failed, keeping original");
            }
        }
    }
    Ok(report)
}
