//! File transfer.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, SortError};

/// Moves a file into an existing directory, keeping its name.
pub trait FileMover {
    /// Moves `source` into `destination_dir` and returns the new path.
    ///
    /// # Errors
    ///
    /// - [`SortError::StaleSource`] if `source` does not exist
    /// - [`SortError::MissingInput`] if `destination_dir` does not exist
    fn move_into(&self, source: &Path, destination_dir: &Path) -> Result<PathBuf>;
}

/// [`FileMover`] backed by the local filesystem.
///
/// Uses `rename`, falling back to copy-then-delete across filesystems.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMover;

impl FileMover for FsMover {
    fn move_into(&self, source: &Path, destination_dir: &Path) -> Result<PathBuf> {
        if !source.is_file() {
            return Err(SortError::stale(source));
        }
        if !destination_dir.is_dir() {
            return Err(SortError::missing("destination folder", destination_dir));
        }
        let Some(name) = source.file_name() else {
            return Err(SortError::stale(source));
        };

        let target = destination_dir.join(name);
        match fs::rename(source, &target) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                fs::copy(source, &target)?;
                fs::remove_file(source)?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(target)
    }
}
