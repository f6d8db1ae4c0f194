//! WhatsApp transcript line classification.
//!
//! Bracketed exports look like this:
//!
//! ```text
//! [1/1/24, 10:00:00] Ana: Lecture notes
//! \u{200E}[1/1/24, 10:00:05] Ana: \u{200E}<attached: 00000135-AUDIO-2024-01-01-10-00-05.opus>
//! [1/1/24, 10:01:00] Ana: audio omitted
//! ```
//!
//! Lines the export generates itself carry a leading U+200E (left-to-right
//! mark). That marker is what separates an attachment from a participant who
//! happens to type `<attached: x>`.

use std::sync::LazyLock;

use regex::Regex;

use crate::message::{AttachmentMarker, ContentMessage, LineEvent, NonMatch};

/// Invisible marker prefixed to system-generated lines.
pub const SYSTEM_MARKER: char = '\u{200E}';

// [date, time] sender: body, with optional leading system marker
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({SYSTEM_MARKER})?\[(\d+/\d+/\d+), (\d+:\d+:\d+)\] ([\w\s]+): (.*)"
    ))
    .expect("line pattern is valid")
});

static ATTACHED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^.*{SYSTEM_MARKER}<attached: (.*)>"))
        .expect("attachment pattern is valid")
});

/// Classifies raw transcript lines.
///
/// Total: every input yields a [`LineEvent`], nothing panics or errors.
///
/// # Example
///
/// ```rust
/// use chatsort::parsing::LineMatcher;
///
/// let matcher = LineMatcher::new();
/// let event = matcher.classify("\u{200E}[1/1/24, 10:00:05] Ana: \u{200E}<attached: note1.opus>\n");
/// assert!(event.is_attachment());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineMatcher;

impl LineMatcher {
    /// Creates a matcher.
    pub fn new() -> Self {
        Self
    }

    /// Classifies one line. Trailing line terminators are ignored.
    pub fn classify(&self, line: &str) -> LineEvent {
        let line = line.trim_end_matches(['\n', '\r']);

        let Some(caps) = LINE_PATTERN.captures(line) else {
            return LineEvent::NonMatch(NonMatch::Unrecognized);
        };

        let marked = caps.get(1).is_some();
        let date = &caps[2];
        let time = &caps[3];
        let sender = &caps[4];
        let body = &caps[5];

        if !marked {
            if is_placeholder(body) {
                return LineEvent::NonMatch(NonMatch::Placeholder);
            }
            return LineEvent::Content(ContentMessage {
                sender: sender.to_string(),
                date: date.to_string(),
                time: time.to_string(),
                text: body.to_string(),
            });
        }

        if body.contains("omitted") {
            return LineEvent::NonMatch(NonMatch::Placeholder);
        }
        if !body.contains("attached") {
            return LineEvent::NonMatch(NonMatch::SystemNotice);
        }

        match extract_attached_name(body) {
            Some(filename) => LineEvent::Attachment(AttachmentMarker {
                sender: sender.to_string(),
                date: date.to_string(),
                time: time.to_string(),
                filename: filename.to_string(),
            }),
            None => LineEvent::NonMatch(NonMatch::MalformedAttachment),
        }
    }
}

/// Media the export dropped shows up as `... omitted` or `... deleted`.
fn is_placeholder(body: &str) -> bool {
    body.contains("omitted") || body.contains("deleted")
}

/// Pulls `NAME` out of a `\u{200E}<attached: NAME>` body.
pub fn extract_attached_name(body: &str) -> Option<&str> {
    ATTACHED_PATTERN
        .captures(body.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> LineEvent {
        LineMatcher::new().classify(line)
    }

    #[test]
    fn test_content_message() {
        let event = classify("[1/1/24, 10:00:00] Ana: Lecture notes\n");
        let LineEvent::Content(msg) = event else {
            panic!("expected content, got {event:?}");
        };
        assert_eq!(msg.sender, "Ana");
        assert_eq!(msg.date, "1/1/24");
        assert_eq!(msg.time, "10:00:00");
        assert_eq!(msg.text, "Lecture notes");
    }

    #[test]
    fn test_attachment_marker() {
        let event = classify("\u{200E}[1/1/24, 10:00:05] Ana: \u{200E}<attached: note1.opus>\n");
        let LineEvent::Attachment(att) = event else {
            panic!("expected attachment, got {event:?}");
        };
        assert_eq!(att.filename, "note1.opus");
        assert_eq!(att.sender, "Ana");
    }

    #[test]
    fn test_attachment_with_spaces_in_name() {
        let event = classify(
            "\u{200E}[4/10/23, 17:00:22] Profe Luis: \u{200E}<attached: 00000135-AUDIO 2023.opus>",
        );
        let LineEvent::Attachment(att) = event else {
            panic!("expected attachment");
        };
        assert_eq!(att.filename, "00000135-AUDIO 2023.opus");
        assert_eq!(att.sender, "Profe Luis");
    }

    #[test]
    fn test_crlf_line_endings() {
        let event = classify("[1/1/24, 10:00:00] Ana: Lecture notes\r\n");
        let LineEvent::Content(msg) = event else {
            panic!("expected content");
        };
        assert_eq!(msg.text, "Lecture notes");
    }

    #[test]
    fn test_placeholders_do_not_open_topics() {
        assert_eq!(
            classify("[1/1/24, 10:00:00] Ana: audio omitted"),
            LineEvent::NonMatch(NonMatch::Placeholder)
        );
        assert_eq!(
            classify("[1/1/24, 10:00:00] Ana: This message was deleted"),
            LineEvent::NonMatch(NonMatch::Placeholder)
        );
        assert_eq!(
            classify("\u{200E}[1/1/24, 10:00:00] Ana: \u{200E}image omitted"),
            LineEvent::NonMatch(NonMatch::Placeholder)
        );
    }

    #[test]
    fn test_marked_line_without_attachment_is_system_notice() {
        assert_eq!(
            classify("\u{200E}[1/1/24, 10:00:00] Ana: \u{200E}Messages and calls are end-to-end encrypted"),
            LineEvent::NonMatch(NonMatch::SystemNotice)
        );
    }

    #[test]
    fn test_malformed_attachment_is_dropped() {
        assert_eq!(
            classify("\u{200E}[1/1/24, 10:00:00] Ana: attached something"),
            LineEvent::NonMatch(NonMatch::MalformedAttachment)
        );
    }

    #[test]
    fn test_typed_attachment_text_without_marker_is_content() {
        let event = classify("[1/1/24, 10:00:00] Ana: <attached: fake.opus>");
        assert!(event.is_content());
    }

    #[test]
    fn test_unrecognized_lines() {
        for line in [
            "",
            "\n",
            "continuation of a multi-line message",
            "[1/1/24 10:00:00] Ana: missing comma",
            "[1/1/24, 10:00] Ana: no seconds",
            "[1/1/24, 10:00:00] +34 600: phone senders are outside the grammar",
            "1/1/24, 10:00 - Ana: dash format",
        ] {
            assert_eq!(
                classify(line),
                LineEvent::NonMatch(NonMatch::Unrecognized),
                "line: {line:?}"
            );
        }
    }

    #[test]
    fn test_empty_body_is_content() {
        let event = classify("[1/1/24, 10:00:00] Ana: ");
        let LineEvent::Content(msg) = event else {
            panic!("expected content");
        };
        assert_eq!(msg.text, "");
    }

    #[test]
    fn test_unicode_sender_and_text() {
        let event = classify("[1/1/24, 10:00:00] José María: Ley 3/2018 orgánica");
        let LineEvent::Content(msg) = event else {
            panic!("expected content");
        };
        assert_eq!(msg.sender, "José María");
        assert_eq!(msg.text, "Ley 3/2018 orgánica");
    }

    #[test]
    fn test_marker_constant_drives_classification() {
        let line = format!("{SYSTEM_MARKER}[1/1/24, 10:00:05] Ana: {SYSTEM_MARKER}<attached: x.pdf>");
        assert!(classify(&line).is_attachment());

        let unmarked = line.replace(SYSTEM_MARKER, "");
        assert!(classify(&unmarked).is_content());
    }

    #[test]
    fn test_extract_attached_name() {
        assert_eq!(
            extract_attached_name("  \u{200E}<attached: a.ogg>  "),
            Some("a.ogg")
        );
        assert_eq!(extract_attached_name("<attached: a.ogg>"), None);
        assert_eq!(extract_attached_name("\u{200E}attached"), None);
    }
}
