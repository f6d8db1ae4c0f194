//! Topic grouping engine.
//!
//! Walks the lines appended since the last run and groups attachments under
//! the content message that most recently preceded them. The message text
//! becomes the topic title.
//!
//! Rules:
//! - a content message opens a new topic and makes it current
//! - an attachment joins the current topic, or is dropped if this run has not
//!   opened one yet (topics from earlier runs never receive attachments)
//! - topics that end the run with no attachments are discarded
//! - equal titles stay separate groups; they converge on the same folder at
//!   placement time
//!
//! # Example
//!
//! ```rust
//! use chatsort::grouping::TopicGrouper;
//! use chatsort::state::ResumeState;
//!
//! let log = vec![
//!     "[1/1/24, 10:00:00] Ana: Lecture notes\n".to_string(),
//!     "\u{200E}[1/1/24, 10:00:05] Ana: \u{200E}<attached: note1.opus>\n".to_string(),
//! ];
//!
//! let grouper = TopicGrouper::new("dump");
//! let ext = grouper.extend(&ResumeState::starting_at(0), &log);
//!
//! assert_eq!(ext.state.topics.len(), 1);
//! assert_eq!(ext.state.topics[0].title, "Lecture notes");
//! assert_eq!(ext.state.last_line_index, 2);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::message::{LineEvent, NonMatch};
use crate::parsing::LineMatcher;
use crate::state::ResumeState;

/// Replacement for path separators in titles.
pub const SEPARATOR_PLACEHOLDER: char = '_';

/// Makes message text usable as a single path component.
///
/// Path separators become [`SEPARATOR_PLACEHOLDER`]; nothing else changes.
pub fn sanitize_title(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '/' | '\\' => SEPARATOR_PLACEHOLDER,
            c => c,
        })
        .collect()
}

/// A topic title and the files filed under it, in log order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicGroup {
    pub title: String,
    pub attachments: Vec<PathBuf>,
}

impl TopicGroup {
    /// Opens an empty topic; `text` is sanitized into the title.
    pub fn open(text: &str) -> Self {
        Self {
            title: sanitize_title(text),
            attachments: Vec::new(),
        }
    }

    /// Returns `true` if no file was filed under this topic.
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

/// Counters for one grouping pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingStats {
    /// Lines read past the resume index.
    pub lines_scanned: usize,
    /// Content messages seen (topics opened).
    pub topics_opened: usize,
    /// Attachments filed under a topic.
    pub attachments: usize,
    /// Attachments seen before any topic was opened in this run.
    pub orphaned: usize,
    /// `attached` lines whose file name could not be extracted.
    pub malformed_markers: usize,
    /// Topics dropped for having no attachments.
    pub discarded_topics: usize,
}

/// Result of [`TopicGrouper::extend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Updated state, ready to be persisted.
    pub state: ResumeState,
    pub stats: GroupingStats,
}

/// Builds topic groups from transcript lines.
#[derive(Debug, Clone)]
pub struct TopicGrouper {
    matcher: LineMatcher,
    base_dir: PathBuf,
}

impl TopicGrouper {
    /// Creates a grouper resolving attachment names against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            matcher: LineMatcher::new(),
            base_dir: base_dir.into(),
        }
    }

    /// Directory attachment names are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Extends `prior` with the lines of `log` it has not consumed yet.
    ///
    /// `log` is the whole transcript; the window starts at
    /// `prior.last_line_index`. An empty window returns `prior` unchanged.
    pub fn extend<S: AsRef<str>>(&self, prior: &ResumeState, log: &[S]) -> Extension {
        let start = prior.last_line_index;
        let window = log.get(start..).unwrap_or_default();

        if window.is_empty() {
            return Extension {
                state: prior.clone(),
                stats: GroupingStats::default(),
            };
        }

        let mut stats = GroupingStats {
            lines_scanned: window.len(),
            ..GroupingStats::default()
        };
        let mut topics = prior.topics.clone();
        let mut current: Option<usize> = None;

        for (offset, line) in window.iter().enumerate() {
            match self.matcher.classify(line.as_ref()) {
                LineEvent::Content(msg) => {
                    topics.push(TopicGroup::open(&msg.text));
                    current = Some(topics.len() - 1);
                    stats.topics_opened += 1;
                    debug!(line = start + offset, title = %msg.text, "topic opened");
                }
                LineEvent::Attachment(att) => match current {
                    Some(idx) => {
                        topics[idx].attachments.push(self.base_dir.join(&att.filename));
                        stats.attachments += 1;
                    }
                    None => {
                        stats.orphaned += 1;
                        debug!(line = start + offset, file = %att.filename, "attachment before any topic, dropped");
                    }
                },
                LineEvent::NonMatch(NonMatch::MalformedAttachment) => {
                    stats.malformed_markers += 1;
                    warn!(line = start + offset, "attachment marker without a file name, dropped");
                }
                LineEvent::NonMatch(_) => {}
            }
        }

        let before = topics.len();
        topics.retain(|t| !t.is_empty());
        stats.discarded_topics = before - topics.len();

        Extension {
            state: ResumeState {
                last_line_index: start.max(log.len()),
                topics,
            },
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARK: &str = "\u{200E}";

    fn content(text: &str) -> String {
        format!("[1/1/24, 10:00:00] Ana: {text}\n")
    }

    fn attached(name: &str) -> String {
        format!("{MARK}[1/1/24, 10:00:05] Ana: {MARK}<attached: {name}>\n")
    }

    fn grouper() -> TopicGrouper {
        TopicGrouper::new("dump")
    }

    #[test]
    fn test_single_topic() {
        let log = vec![content("Lecture notes"), attached("note1.opus")];
        let ext = grouper().extend(&ResumeState::starting_at(0), &log);

        assert_eq!(
            ext.state.topics,
            vec![TopicGroup {
                title: "Lecture notes".into(),
                attachments: vec![PathBuf::from("dump/note1.opus")],
            }]
        );
        assert_eq!(ext.stats.topics_opened, 1);
        assert_eq!(ext.stats.attachments, 1);
    }

    #[test]
    fn test_topic_without_attachments_is_discarded() {
        let log = vec![
            content("chatter"),
            content("Tema 1"),
            attached("a.opus"),
            content("trailing"),
        ];
        let ext = grouper().extend(&ResumeState::starting_at(0), &log);

        assert_eq!(ext.state.topics.len(), 1);
        assert_eq!(ext.state.topics[0].title, "Tema 1");
        assert_eq!(ext.stats.discarded_topics, 2);
    }

    #[test]
    fn test_attachments_follow_nearest_topic() {
        let log = vec![
            content("A"),
            attached("a1.opus"),
            attached("a2.opus"),
            content("B"),
            "continuation line\n".to_string(),
            attached("b1.jpg"),
        ];
        let ext = grouper().extend(&ResumeState::starting_at(0), &log);

        assert_eq!(ext.state.topics.len(), 2);
        assert_eq!(ext.state.topics[0].attachments.len(), 2);
        assert_eq!(
            ext.state.topics[1].attachments,
            vec![PathBuf::from("dump/b1.jpg")]
        );
    }

    #[test]
    fn test_orphan_attachment_dropped() {
        let log = vec![attached("lost.opus"), content("A"), attached("a.opus")];
        let ext = grouper().extend(&ResumeState::starting_at(0), &log);

        assert_eq!(ext.stats.orphaned, 1);
        assert_eq!(ext.state.topics.len(), 1);
        assert_eq!(ext.state.topics[0].attachments.len(), 1);
    }

    #[test]
    fn test_prior_topics_never_receive_new_attachments() {
        let prior = ResumeState {
            last_line_index: 2,
            topics: vec![TopicGroup {
                title: "Old".into(),
                attachments: vec![PathBuf::from("dump/old.opus")],
            }],
        };
        let log = vec![content("Old"), attached("old.opus"), attached("new.opus")];
        let ext = grouper().extend(&prior, &log);

        assert_eq!(ext.state.topics, prior.topics);
        assert_eq!(ext.stats.orphaned, 1);
        assert_eq!(ext.state.last_line_index, 3);
    }

    #[test]
    fn test_duplicate_titles_stay_distinct() {
        let log = vec![
            content("Lecture notes"),
            attached("a.opus"),
            content("Lecture notes"),
            attached("b.opus"),
        ];
        let ext = grouper().extend(&ResumeState::starting_at(0), &log);

        assert_eq!(ext.state.topics.len(), 2);
        assert!(ext.state.topics.iter().all(|t| t.title == "Lecture notes"));
    }

    #[test]
    fn test_empty_window_is_noop() {
        let prior = ResumeState {
            last_line_index: 2,
            topics: vec![TopicGroup {
                title: "Kept".into(),
                attachments: vec![PathBuf::from("dump/k.opus")],
            }],
        };
        let log = vec![content("Kept"), attached("k.opus")];
        let ext = grouper().extend(&prior, &log);

        assert_eq!(ext.state, prior);
        assert_eq!(ext.stats, GroupingStats::default());
    }

    #[test]
    fn test_shorter_log_never_rewinds_index() {
        let prior = ResumeState::starting_at(10);
        let log = vec![content("A"), attached("a.opus")];
        let ext = grouper().extend(&prior, &log);

        assert_eq!(ext.state.last_line_index, 10);
    }

    #[test]
    fn test_skips_header_lines() {
        let log = vec![
            content("Header topic"),
            attached("header.opus"),
            content("Body topic"),
            attached("body.opus"),
        ];
        let ext = grouper().extend(&ResumeState::starting_at(2), &log);

        assert_eq!(ext.state.topics.len(), 1);
        assert_eq!(ext.state.topics[0].title, "Body topic");
    }

    #[test]
    fn test_malformed_markers_counted() {
        let log = vec![
            content("A"),
            format!("{MARK}[1/1/24, 10:00:05] Ana: attached but broken\n"),
            attached("a.opus"),
        ];
        let ext = grouper().extend(&ResumeState::starting_at(0), &log);

        assert_eq!(ext.stats.malformed_markers, 1);
        assert_eq!(ext.state.topics[0].attachments.len(), 1);
    }

    #[test]
    fn test_placeholders_do_not_break_grouping() {
        let log = vec![
            content("A"),
            content("audio omitted"),
            attached("a.opus"),
        ];
        let ext = grouper().extend(&ResumeState::starting_at(0), &log);

        assert_eq!(ext.state.topics.len(), 1);
        assert_eq!(ext.state.topics[0].title, "A");
    }

    #[test]
    fn test_title_separators_sanitized() {
        let log = vec![content("Ley 3/2018 y RD 1\\2"), attached("a.pdf")];
        let ext = grouper().extend(&ResumeState::starting_at(0), &log);

        assert_eq!(ext.state.topics[0].title, "Ley 3_2018 y RD 1_2");
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("PSX ley 3/2001"), "PSX ley 3_2001");
        assert_eq!(sanitize_title("plain"), "plain");
        assert_eq!(sanitize_title(""), "");
    }
}
