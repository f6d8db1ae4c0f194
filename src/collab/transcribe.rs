//! Speech-to-text over the sorted audio corpus.
//!
//! Audio files are mirrored into a transcripts tree: `sorted/Tema/a.wav`
//! becomes `transcripts/Tema/a.txt`. A file whose transcript already exists
//! is never sent to the transcriber again.
//!
//! Several audio roots can share one transcripts tree, e.g. audio extracted
//! from videos next to the sorted chat audio. The first root to claim a
//! transcript path wins.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SortError};

/// Audio extensions picked up when none are configured.
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["wav", "opus"];

/// Turns an audio file into plain text.
pub trait Transcriber {
    /// Transcribes `audio` spoken in `language`.
    fn transcribe(&self, audio: &Path, language: &str) -> Result<String>;
}

/// [`Transcriber`] running an external program that prints the text on stdout.
///
/// Invoked as `<program> --language <language> <audio>`.
#[derive(Debug, Clone)]
pub struct CommandTranscriber {
    program: String,
}

impl CommandTranscriber {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Transcriber for CommandTranscriber {
    fn transcribe(&self, audio: &Path, language: &str) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--language")
            .arg(language)
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
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// One audio file and where its transcript goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionJob {
    pub audio: PathBuf,
    pub transcript: PathBuf,
}

/// Outcome of a transcription sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TranscriptionReport {
    pub written: usize,
    pub failed: usize,
}

/// One sentence per line.
pub fn format_transcript(text: &str) -> String {
    text.trim().replace(". ", ".\n")
}

/// Lists audio files under `audio_root` that have no transcript yet.
pub fn pending_transcriptions(
    audio_root: &Path,
    transcripts_root: &Path,
    extensions: &[&str],
) -> Vec<TranscriptionJob> {
    let mut jobs: Vec<TranscriptionJob> = WalkDir::new(audio_root)
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
            let relative = entry.path().strip_prefix(audio_root).ok()?;
            let transcript = transcripts_root.join(relative).with_extension("txt");
            (!transcript.exists()).then(|| TranscriptionJob {
                audio: entry.path().to_path_buf(),
                transcript,
            })
        })
        .collect();
    jobs.sort_by(|a, b| a.audio.cmp(&b.audio));
    jobs
}

/// [`pending_transcriptions`] over several audio roots, in root order.
///
/// Files from different roots that mirror to the same transcript are
/// transcribed once.
pub fn pending_transcriptions_across(
    audio_roots: &[PathBuf],
    transcripts_root: &Path,
    extensions: &[&str],
) -> Vec<TranscriptionJob> {
    let mut claimed = HashSet::new();
    audio_roots
        .iter()
        .flat_map(|root| pending_transcriptions(root, transcripts_root, extensions))
        .filter(|job| claimed.insert(job.transcript.clone()))
        .collect()
}

/// Runs every job, writing transcripts as UTF-8 text.
///
/// A failing file is logged and counted; the rest still run.
pub fn transcribe_pending(
    jobs: &[TranscriptionJob],
    transcriber: &dyn Transcriber,
    language: &str,
) -> Result<TranscriptionReport> {
    let mut report = TranscriptionReport::default();

    for job in jobs {
        info!(file = %job.audio.display(), "transcribing");
        match transcriber.transcribe(&job.audio, language) {
            Ok(text) => {
                if let Some(parent) = job.transcript.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&job.transcript, format_transcript(&text))?;
                report.written += 1;
            }
            Err(e) => {
                report.failed += 1;
                warn!(file = %job.audio.display(), error = %e, "transcription failed");
            }
        }
    }
    Ok(report)
}
