//! Parsed transcript line events.
//!
//! Every raw transcript line maps to exactly one [`LineEvent`]:
//!
//! - [`LineEvent::Content`] - an ordinary message typed by a participant.
//!   Its text becomes a topic title.
//! - [`LineEvent::Attachment`] - a system-generated `<attached: NAME>` line,
//!   recognised by the invisible U+200E marker the export puts in front of it.
//! - [`LineEvent::NonMatch`] - anything else: continuation text, blank lines,
//!   media placeholders the export dropped, system notices.
//!
//! # Example
//!
//! ```
//! use chatsort::message::{ContentMessage, LineEvent};
//!
//! let event = LineEvent::Content(ContentMessage {
//!     sender: "Ana".into(),
//!     date: "1/1/24".into(),
//!     time: "10:00:00".into(),
//!     text: "Lecture notes".into(),
//! });
//!
//! assert!(event.is_content());
//! assert!(event.timestamp().is_some());
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Date layouts seen in bracketed exports, tried in order.
///
/// Month-first wins on ambiguous dates like `1/2/24`.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%y, %H:%M:%S",
    "%m/%d/%Y, %H:%M:%S",
    "%d/%m/%y, %H:%M:%S",
    "%d/%m/%Y, %H:%M:%S",
];

/// Parses a bracketed `date, time` pair into a naive timestamp.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let datetime = format!("{date}, {time}");
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&datetime, fmt).ok())
}

/// A message typed by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMessage {
    /// Display name of the author.
    pub sender: String,
    /// Date as written in the export, e.g. `1/1/24`.
    pub date: String,
    /// Time as written in the export, e.g. `10:00:05`.
    pub time: String,
    /// Message body.
    pub text: String,
}

/// A file shared in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMarker {
    /// Display name of the author.
    pub sender: String,
    /// Date as written in the export.
    pub date: String,
    /// Time as written in the export.
    pub time: String,
    /// File name as it appears in the export bundle.
    pub filename: String,
}

/// Why a line produced no event.
///
/// Purely diagnostic: every variant has the same effect on grouping (none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonMatch {
    /// The line does not follow the `[date, time] sender: body` grammar.
    Unrecognized,
    /// A media placeholder (`omitted`/`deleted`) the export did not include.
    Placeholder,
    /// A marked system line that is not an attachment.
    SystemNotice,
    /// A marked `attached` line whose file name could not be extracted.
    MalformedAttachment,
}

/// Outcome of classifying one transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    Content(ContentMessage),
    Attachment(AttachmentMarker),
    NonMatch(NonMatch),
}

impl LineEvent {
    /// Returns `true` for a participant message.
    pub fn is_content(&self) -> bool {
        matches!(self, LineEvent::Content(_))
    }

    /// Returns `true` for an attachment marker.
    pub fn is_attachment(&self) -> bool {
        matches!(self, LineEvent::Attachment(_))
    }

    /// Returns `true` if the line produced no event.
    pub fn is_non_match(&self) -> bool {
        matches!(self, LineEvent::NonMatch(_))
    }

    /// Sender of the line, if it matched the grammar.
    pub fn sender(&self) -> Option<&str> {
        match self {
            LineEvent::Content(m) => Some(&m.sender),
            LineEvent::Attachment(a) => Some(&a.sender),
            LineEvent::NonMatch(_) => None,
        }
    }

    /// Parsed timestamp of the line, if it matched and the date is valid.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            LineEvent::Content(m) => parse_timestamp(&m.date, &m.time),
            LineEvent::Attachment(a) => parse_timestamp(&a.date, &a.time),
            LineEvent::NonMatch(_) => None,
        }
    }
}
