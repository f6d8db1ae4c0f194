//! # Chatsort
//!
//! Files the attachments of an exported chat into topic folders.
//!
//! ## Overview
//!
//! A chat export is a transcript plus loose media files. In the transcript,
//! a participant typically posts a message naming a subject ("Normativa PSX")
//! and then shares the files that belong to it. Chatsort reads the
//! transcript, treats each message as a topic, and moves every attachment into
//! the folder of the topic that most recently preceded it.
//!
//! Runs are incremental. The export keeps growing, and each run:
//!
//! 1. reads only the lines appended since the previous run
//! 2. persists the new resume index and topics
//! 3. moves only the files whose destination does not exist yet
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatsort::collab::{FfmpegTranscoder, FsMover};
//! use chatsort::pipeline::{RunOptions, RunOutcome, run};
//! use chatsort::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = SortConfig::new().with_work_dir("profe");
//!     let transcoder = FfmpegTranscoder::new("ffmpeg", "wav");
//!
//!     match run(&config, RunOptions::default(), &FsMover, &transcoder)? {
//!         RunOutcome::NoNewData { .. } => println!("nothing new"),
//!         RunOutcome::Completed(report) => println!("moved {}", report.placement.moved),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`parsing`] - [`LineMatcher`](parsing::LineMatcher), one line to one [`LineEvent`]
//! - [`grouping`] - [`TopicGrouper`](grouping::TopicGrouper), lines to [`TopicGroup`]s
//! - [`state`] - [`ResumeState`](state::ResumeState) and its JSON [`StateStore`](state::StateStore)
//! - [`placement`] - [`Planner`](placement::Planner) and [`execute`](placement::execute)
//! - [`collab`] - file moves, transcoding, transcription, bundle extraction
//! - [`pipeline`] - one full run
//! - [`config`] - [`SortConfig`](config::SortConfig), TOML-loadable
//! - [`error`] - [`SortError`], [`Result`]

#[cfg(feature = "cli")]
pub mod cli;
pub mod collab;
pub mod config;
pub mod error;
pub mod grouping;
pub mod logging;
pub mod message;
pub mod parsing;
pub mod pipeline;
pub mod placement;
pub mod state;

// Re-export the main types at the crate root for convenience
pub use error::{Result, SortError};
pub use grouping::TopicGroup;
pub use message::LineEvent;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatsort::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, SortError};

    pub use crate::message::{AttachmentMarker, ContentMessage, LineEvent, NonMatch};
    pub use crate::parsing::LineMatcher;

    pub use crate::grouping::{Extension, GroupingStats, TopicGroup, TopicGrouper};
    pub use crate::state::{ResumeState, StateStore};

    pub use crate::placement::{Conversion, PlacementRecord, PlacementReport, Plan, Planner};

    pub use crate::config::SortConfig;
    pub use crate::pipeline::{RunOptions, RunOutcome, RunReport};
}
