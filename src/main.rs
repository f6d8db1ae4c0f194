//! # chatsort CLI
//!
//! Command-line interface for the chatsort library.

use std::fs;
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;

use chatsort::cli::{Args, Command, SortArgs, TranscribeArgs};
use chatsort::collab::{
    CommandTranscriber, FfmpegExtractor, FfmpegTranscoder, FsMover, extract_pending,
    pending_extractions, pending_transcriptions_across, transcribe_pending,
};
use chatsort::config::SortConfig;
use chatsort::pipeline::{RunOutcome, RunReport, run};
use chatsort::state::StateStore;
use chatsort::{SortError, logging};

fn main() {
    if let Err(e) = start() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn start() -> Result<(), SortError> {
    let args = <Args as ClapParser>::parse();
    let config = SortConfig::discover(args.config.as_deref())?;
    logging::init(&config.log_level, args.verbose)?;

    match &args.command {
        Command::Sort(sort) => cmd_sort(config, sort),
        Command::Status { json, state_file } => {
            let path = state_file.as_deref().unwrap_or(&config.state_file);
            cmd_status(path, config.start_line, *json)
        }
        Command::Transcribe(transcribe) => cmd_transcribe(&config, transcribe),
    }
}

fn cmd_sort(config: SortConfig, sort: &SortArgs) -> Result<(), SortError> {
    let total_start = Instant::now();
    let config = sort.apply(config);
    let options = sort.options();

    println!("🗂️  chatsort v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if options.extract {
        println!("📥 Source:  {}", config.source_dir.display());
    }
    println!("📖 Log:     {}", config.chat_log_path().display());
    println!("📂 Sorted:  {}", config.sorted_path().display());
    println!("💾 State:   {}", config.state_file.display());
    if options.dry_run {
        println!("🧪 Mode:    Dry run");
    }
    println!();

    let transcoder = FfmpegTranscoder::new(&config.transcoder, &config.converted_extension);
    match run(&config, options, &FsMover, &transcoder)? {
        RunOutcome::NoNewData {
            last_line_index,
            total_lines,
        } => {
            println!(
                "⚠️  No new lines to parse ({} of {} already read)",
                last_line_index, total_lines
            );
        }
        RunOutcome::Completed(report) => print_report(&report),
    }

    println!();
    println!("⚡ Done in {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}

fn print_report(report: &RunReport) {
    if report.bundles > 0 {
        println!(
            "📦 Collected {} bundle(s), unpacked {} file(s)",
            report.bundles, report.extracted
        );
    }

    let g = &report.grouping;
    println!(
        "🔍 Scanned {} new line(s) of {}",
        g.lines_scanned, report.total_lines
    );
    println!(
        "   {} topic(s) opened, {} attachment(s) filed, {} topic(s) persisted",
        g.topics_opened, g.attachments, report.topics
    );
    if g.orphaned > 0 {
        println!("   {} attachment(s) had no preceding topic", g.orphaned);
    }
    if g.malformed_markers > 0 {
        println!("   {} attachment marker(s) without a file name", g.malformed_markers);
    }

    let p = &report.placement;
    let verb = if p.dry_run { "Would move" } else { "Moved" };
    println!();
    println!("🚚 {} {} file(s)", verb, p.moved);
    println!("   {} already placed", report.already_placed + p.already_present);
    if p.stale > 0 {
        println!("   {} source(s) already gone", p.stale);
    }
    if p.failed > 0 {
        println!("   {} file(s) skipped, folder could not be created", p.failed);
    }

    if let Some(c) = &report.conversion {
        println!("🎧 Converted {} audio file(s)", c.converted);
        if c.failed > 0 {
            println!("   {} conversion(s) failed, originals kept", c.failed);
        }
    }
}

fn cmd_status(path: &Path, start_line: usize, json: bool) -> Result<(), SortError> {
    let store = StateStore::new(path, start_line);
    let state = store.load()?;

    if json {
        let out = serde_json::to_string_pretty(&state).map_err(|e| SortError::state(path, e))?;
        println!("{}", out);
        return Ok(());
    }

    if !store.exists() {
        println!("📭 No runs yet ({} not found)", path.display());
        return Ok(());
    }

    println!("📍 Lines read:  {}", state.last_line_index);
    println!("🗂️  Topics:      {}", state.topics.len());
    println!("📎 Attachments: {}", state.attachment_count());
    for topic in &state.topics {
        println!("   {} ({})", topic.title, topic.attachments.len());
    }
    Ok(())
}

fn cmd_transcribe(config: &SortConfig, args: &TranscribeArgs) -> Result<(), SortError> {
    let language = args.language.as_deref().unwrap_or(&config.language);

    if let Some(videos) = &args.videos {
        if !videos.is_dir() {
            return Err(SortError::missing("video directory", videos));
        }
        let Some(audio_root) = args.audio_dirs.first() else {
            return Err(SortError::config(None, "no audio directory to extract into"));
        };
        fs::create_dir_all(audio_root)?;

        let extensions: Vec<&str> = args.video_extensions.iter().map(String::as_str).collect();
        let jobs = pending_extractions(videos, audio_root, &extensions);
        println!("🎬 {} video(s) to extract", jobs.len());

        let extractor = FfmpegExtractor::new(&config.transcoder);
        let report = extract_pending(&jobs, &extractor)?;
        println!("🔊 Extracted {} audio file(s)", report.written);
        if report.failed > 0 {
            println!("   {} failed", report.failed);
        }
    }

    if let Some(missing) = args.audio_dirs.iter().find(|dir| !dir.is_dir()) {
        return Err(SortError::missing("audio directory", missing));
    }

    let extensions: Vec<&str> = args.extensions.iter().map(String::as_str).collect();
    let jobs = pending_transcriptions_across(&args.audio_dirs, &args.output, &extensions);
    println!("📝 {} file(s) to transcribe ({})", jobs.len(), language);

    let transcriber = CommandTranscriber::new(&config.transcriber);
    let report = transcribe_pending(&jobs, &transcriber, language)?;

    println!("✅ Wrote {} transcript(s)", report.written);
    if report.failed > 0 {
        println!("   {} failed", report.failed);
    }
    Ok(())
}
