//! Transcript parsing.
//!
//! Turns raw transcript lines into [`LineEvent`](crate::message::LineEvent)s.
//! Only the bracketed WhatsApp layout is supported.

pub mod whatsapp;

pub use whatsapp::{LineMatcher, SYSTEM_MARKER, extract_attached_name};
