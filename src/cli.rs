//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure
//! - [`Command`] - subcommands (`sort`, `status`, `transcribe`)
//! - [`SortArgs`], [`TranscribeArgs`] - per-subcommand flags

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::collab::extract::DEFAULT_VIDEO_EXTENSIONS;
use crate::collab::transcribe::DEFAULT_AUDIO_EXTENSIONS;
use crate::config::SortConfig;
use crate::pipeline::RunOptions;

/// File chat-export attachments into topic folders.
///
/// Each attachment goes to the folder named after the message that preceded
/// it. Safe to rerun: only new transcript lines are read, and files already
/// filed are left alone.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatsort")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatsort sort --source-dir ~/Downloads
    chatsort sort --skip-extract --dry-run
    chatsort status --json
    chatsort transcribe audios profe/sorted -o transcripts --videos videos")]
pub struct Args {
    /// Config file (default: ./chatsort.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Collect the export, group new lines into topics, and file attachments
    Sort(SortArgs),

    /// Show the persisted resume state
    Status {
        /// Print the state as JSON
        #[arg(long)]
        json: bool,

        /// State file (overrides config)
        #[arg(long, value_name = "FILE")]
        state_file: Option<PathBuf>,
    },

    /// Transcribe audio files that have no transcript yet
    Transcribe(TranscribeArgs),
}

/// Flags of the `transcribe` subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct TranscribeArgs {
    /// Roots of the audio files (e.g. the extracted audio dir and the sorted dir)
    #[arg(required = true, value_name = "AUDIO_DIR")]
    pub audio_dirs: Vec<PathBuf>,

    /// Root the transcripts are mirrored into
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Extract audio from the videos under DIR into the first audio root first
    #[arg(long, value_name = "DIR")]
    pub videos: Option<PathBuf>,

    /// Spoken language (overrides config)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Audio extensions to pick up
    #[arg(long, value_delimiter = ',', default_values_t = owned(DEFAULT_AUDIO_EXTENSIONS))]
    pub extensions: Vec<String>,

    /// Video extensions to extract audio from
    #[arg(long, value_delimiter = ',', default_values_t = owned(DEFAULT_VIDEO_EXTENSIONS))]
    pub video_extensions: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Flags of the `sort` subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SortArgs {
    /// Directory holding freshly exported bundles
    #[arg(short, long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Processing directory
    #[arg(short, long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Resume state file
    #[arg(long, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Use the already staged transcript instead of collecting bundles
    #[arg(long)]
    pub skip_extract: bool,

    /// Leave audio in its original container
    #[arg(long)]
    pub no_convert: bool,

    /// Show what would be moved without touching anything
    #[arg(long)]
    pub dry_run: bool,
}

impl SortArgs {
    /// Overlays the flags given on the command line onto `config`.
    pub fn apply(&self, mut config: SortConfig) -> SortConfig {
        if let Some(dir) = &self.source_dir {
            config.source_dir.clone_from(dir);
        }
        if let Some(dir) = &self.work_dir {
            config.work_dir.clone_from(dir);
        }
        if let Some(file) = &self.state_file {
            config.state_file.clone_from(file);
        }
        config
    }

    /// Run switches implied by the flags.
    pub fn options(&self) -> RunOptions {
        RunOptions {
            extract: cfg!(feature = "archive") && !self.skip_extract,
            convert: !self.no_convert,
            dry_run: self.dry_run,
        }
    }
}
