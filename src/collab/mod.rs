//! Collaborators around the sorting core.
//!
//! Each one does a single job behind a small contract:
//!
//! - [`extract`] - pull the audio track out of recorded videos ([`AudioExtractor`])
//! - [`mover`] - move a file into an existing folder ([`FileMover`])
//! - [`transcode`] - convert placed audio to another container ([`Transcoder`])
//! - [`transcribe`] - speech-to-text over the sorted corpus ([`Transcriber`])
//! - `archive` - collect and unpack export bundles (feature `archive`)
//!
//! The traits are the seams tests plug fakes into.

#[cfg(feature = "archive")]
pub mod archive;
pub mod extract;
pub mod mover;
pub mod transcode;
pub mod transcribe;

pub use extract::{
    AudioExtractor, ExtractionJob, ExtractionReport, FfmpegExtractor, extract_pending,
    pending_extractions,
};
pub use mover::{FileMover, FsMover};
pub use transcode::{ConversionReport, FfmpegTranscoder, Transcoder, convert_pending};
pub use transcribe::{
    CommandTranscriber, Transcriber, TranscriptionJob, TranscriptionReport,
    pending_transcriptions, pending_transcriptions_across, transcribe_pending,
};
