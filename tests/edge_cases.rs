//! Edge case tests for chatsort
//!
//! Transcript quirks and filesystem corner cases that regular unit tests
//! do not reach.

use chatsort::collab::{FsMover, Transcoder};
use chatsort::pipeline::run;
use chatsort::placement::{MAX_FOLDER_BYTES, execute, folder_name};
use chatsort::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const MARK: &str = "\u{200E}";

// =========================================================================
// Transcript quirks
// =========================================================================

#[test]
fn test_crlf_transcript() {
    let log: Vec<String> = format!(
        "[1/1/24, 10:00:00] Ana: Tema\r\n{MARK}[1/1/24, 10:00:05] Ana: {MARK}<attached: a.opus>\r\n"
    )
    .lines()
    .map(str::to_string)
    .collect();

    let ext = TopicGrouper::new("dump").extend(&ResumeState::starting_at(0), &log);

    assert_eq!(ext.state.topics.len(), 1);
    assert_eq!(ext.state.topics[0].title, "Tema");
    assert_eq!(ext.state.topics[0].attachments, vec![PathBuf::from("dump/a.opus")]);
}

#[test]
fn test_multiline_message_continuation_is_ignored() {
    let log = vec![
        "[1/1/24, 10:00:00] Ana: Tema largo".to_string(),
        "que sigue en otra línea".to_string(),
        format!("{MARK}[1/1/24, 10:00:05] Ana: {MARK}<attached: a.pdf>"),
    ];

    let ext = TopicGrouper::new("dump").extend(&ResumeState::starting_at(0), &log);

    assert_eq!(ext.state.topics[0].title, "Tema largo");
    assert_eq!(ext.state.topics[0].attachments.len(), 1);
}

#[test]
fn test_unicode_titles() {
    let log = vec![
        "[1/1/24, 10:00:00] José: Ley 3/2018 orgánica de protección de datos 🔒".to_string(),
        format!("{MARK}[1/1/24, 10:00:05] José: {MARK}<attached: ley.pdf>"),
    ];

    let ext = TopicGrouper::new("dump").extend(&ResumeState::starting_at(0), &log);

    assert_eq!(
        ext.state.topics[0].title,
        "Ley 3_2018 orgánica de protección de datos 🔒"
    );
}

#[test]
fn test_attachment_name_with_brackets() {
    let matcher = LineMatcher::new();
    let event =
        matcher.classify(&format!("{MARK}[1/1/24, 10:00:05] Ana: {MARK}<attached: a <1>.pdf>"));

    let LineEvent::Attachment(att) = event else {
        panic!("expected attachment");
    };
    assert_eq!(att.filename, "a <1>.pdf");
}

#[test]
fn test_only_noise_produces_nothing() {
    let log = vec![
        String::new(),
        "random text".to_string(),
        "[1/1/24, 10:00:00] Ana: image omitted".to_string(),
        format!("{MARK}[1/1/24, 10:00:00] Ana: {MARK}sticker omitted"),
    ];

    let ext = TopicGrouper::new("dump").extend(&ResumeState::starting_at(0), &log);

    assert!(ext.state.topics.is_empty());
    assert_eq!(ext.stats.topics_opened, 0);
    assert_eq!(ext.state.last_line_index, 4);
}

#[test]
fn test_timestamps_on_events() {
    let matcher = LineMatcher::new();
    let event = matcher.classify("[12/31/23, 23:59:59] Ana: Fin de año");
    let ts = event.timestamp().unwrap();
    assert_eq!(ts.to_string(), "2023-12-31 23:59:59");
}

// =========================================================================
// Filesystem corner cases
// =========================================================================

#[test]
fn test_dot_titles_stay_inside_root() {
    let dir = tempdir().unwrap();
    let dump = dir.path().join("dump");
    let sorted = dir.path().join("sorted");
    fs::create_dir(&dump).unwrap();
    fs::write(dump.join("a.pdf"), b"a").unwrap();

    let topics = vec![TopicGroup {
        title: "..".into(),
        attachments: vec![dump.join("a.pdf")],
    }];
    let plan = Planner::default().plan(&topics, &sorted);
    execute(&plan.records, &FsMover, false).unwrap();

    assert!(sorted.join("__/a.pdf").exists());
    assert!(!dir.path().join("a.pdf").exists());
}

#[test]
fn test_folder_name_is_idempotent() {
    for title in ["a/b", "..", "", "Tema 1", "x\\y"] {
        let once = folder_name(title);
        assert_eq!(folder_name(&once), once, "title: {title:?}");
    }
}

#[test]
fn test_custom_conversion_target() {
    let dir = tempdir().unwrap();
    let sorted = dir.path().join("sorted");
    fs::create_dir_all(sorted.join("Tema")).unwrap();
    fs::write(sorted.join("Tema/a.mp3"), b"").unwrap();

    let topics = vec![TopicGroup {
        title: "Tema".into(),
        attachments: vec![PathBuf::from("dump/a.ogg"), PathBuf::from("dump/b.ogg")],
    }];
    let plan = Planner::new(Conversion::new(["ogg"], "mp3")).plan(&topics, &sorted);

    assert_eq!(plan.skipped, 1);
    assert_eq!(plan.records.len(), 1);
    assert_eq!(plan.records[0].file_name, PathBuf::from("b.ogg"));
}

#[test]
fn test_empty_topic_list_plans_nothing() {
    let dir = tempdir().unwrap();
    let plan = Planner::default().plan(&[], dir.path());
    assert!(plan.is_empty());
    assert_eq!(plan.skipped, 0);
}

struct NoTranscoder;

impl Transcoder for NoTranscoder {
    fn convert(&self, source: &Path) -> Result<PathBuf> {
        Err(SortError::command("none", source.display().to_string()))
    }
}

#[test]
fn test_long_message_title_does_not_block_later_topics() {
    let dir = tempdir().unwrap();
    let config = SortConfig::new()
        .with_work_dir(dir.path().join("profe"))
        .with_state_file(dir.path().join("state.json"))
        .with_start_line(0);
    let staging = config.staging_path();
    fs::create_dir_all(&staging).unwrap();
    fs::write(staging.join("a.pdf"), b"a").unwrap();
    fs::write(staging.join("b.pdf"), b"b").unwrap();

    let long = "Resumen de la clase de hoy ".repeat(12);
    assert!(long.len() > MAX_FOLDER_BYTES);
    let mut log = vec![
        format!("[1/1/24, 10:00:00] Ana: {long}"),
        format!("{MARK}[1/1/24, 10:00:05] Ana: {MARK}<attached: a.pdf>"),
        "[1/1/24, 10:01:00] Ana: Tema corto".to_string(),
        format!("{MARK}[1/1/24, 10:01:05] Ana: {MARK}<attached: b.pdf>"),
    ];
    fs::write(config.chat_log_path(), log.join("\n")).unwrap();

    let options = RunOptions {
        extract: false,
        convert: false,
        dry_run: false,
    };
    run(&config, options, &FsMover, &NoTranscoder).unwrap();

    let folder = config.sorted_path().join(folder_name(&long));
    assert!(folder.join("a.pdf").exists());
    assert!(config.sorted_path().join("Tema corto/b.pdf").exists());

    // Later runs re-plan the saved long topic without failing
    log.push("[1/1/24, 10:02:00] Ana: gracias".to_string());
    fs::write(config.chat_log_path(), log.join("\n")).unwrap();
    let RunOutcome::Completed(report) = run(&config, options, &FsMover, &NoTranscoder).unwrap()
    else {
        panic!("expected a completed run");
    };
    assert_eq!(report.already_placed, 2);
    assert_eq!(report.placement.failed, 0);
}
