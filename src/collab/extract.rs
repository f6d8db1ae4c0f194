//! Audio extraction from recorded videos.
//!
//! Videos are mirrored into an audio tree as 16 kHz mono WAV files, ready for
//! transcription: `videos/Clase 1/a.mp4` becomes `audios/Clase 1/a.wav`.
//! A video whose audio file already exists is skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SortError};

/// Video extensions picked up when none are configured.
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4"];

/// Sample rate of extracted audio, in Hz.
pub const EXTRACTED_SAMPLE_RATE: u32 = 16_000;

/// Writes the audio track of a video to a file.
pub trait AudioExtractor {
    /// Extracts the audio of `video` into `audio`, replacing it if present.
    fn extract(&self, video: &Path, audio: &Path) -> Result<()>;
}

/// [`AudioExtractor`] that shells out to `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    program: String,
}

impl FfmpegExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl AudioExtractor for FfmpegExtractor {
    fn extract(&self, video: &Path, audio: &Path) -> Result<()> {
        let output = Command::new(&self.program)
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(video)
            .args(["-vn", "-ac", "1", "-ar"])
            .arg(EXTRACTED_SAMPLE_RATE.to_string())
            .arg(audio)
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
        Ok(())
    }
}

/// One video and the audio file it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    pub video: PathBuf,
    pub audio: PathBuf,
}

/// Outcome of an extraction sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub written: usize,
    pub failed: usize,
}

/// Lists videos under `videos_root` whose mirrored `.wav` under `audio_root`
/// does not exist yet.
pub fn pending_extractions(
    videos_root: &Path,
    audio_root: &Path,
    extensions: &[&str],
) -> Vec<ExtractionJob> {
    let mut jobs: Vec<ExtractionJob> = WalkDir::new(videos_root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
        })
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(videos_root).ok()?;
            let audio = audio_root.join(relative).with_extension("wav");
            (!audio.exists()).then(|| ExtractionJob {
                video: entry.path().to_path_buf(),
                audio,
            })
        })
        .collect();
    jobs.sort_by(|a, b| a.video.cmp(&b.video));
    jobs
}

/// Runs every job, creating parent folders as needed.
///
/// A failing video is logged and counted; the rest still run.
pub fn extract_pending(
    jobs: &[ExtractionJob],
    extractor: &dyn AudioExtractor,
) -> Result<ExtractionReport> {
    let mut report = ExtractionReport::default();

    for job in jobs {
        if let Some(parent) = job.audio.parent() {
            fs::create_dir_all(parent)?;
        }
        match extractor.extract(&job.video, &job.audio) {
            Ok(()) => {
                report.written += 1;
                info!(from = %job.video.display(), to = %job.audio.display(), "audio extracted");
            }
            Err(e) => {
                report.failed += 1;
                warn!(file = %job.video.display(), error = %e, "audio extraction failed");
            }
        }
    }
    Ok(report)
}
