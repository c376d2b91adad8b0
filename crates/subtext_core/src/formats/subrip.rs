//! SubRip (SRT) format adapter.
//!
//! # Format Overview
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! Hello, world!
//!
//! 2
//! 00:00:05,000 --> 00:00:08,000
//! This is a test.
//! ```
//!
//! The index number is ignored during reading and regenerated on write.
//! Italic, underline and strikeout styling is written as HTML-like tags.

use crate::error::ParseError;
use crate::model::SubtitleTrack;
use crate::times::{ms_to_times, timestamp_to_ms, TIMESTAMP};

use super::engine::{self, TimedTextSyntax};
use super::{Format, ReadOptions, WriteOptions};

/// Largest timestamp SubRip can express: 99:59:59,999.
pub const MAX_REPRESENTABLE_MS: i64 = 100 * 3_600_000 - 1;

static SYNTAX: TimedTextSyntax = TimedTextSyntax {
    timestamp: &TIMESTAMP,
    parse_timestamp: timestamp_to_ms,
    format_timestamp: ms_to_timestamp,
    sort_visible_by_start: false,
    header: None,
};

/// Render milliseconds as `HH:MM:SS,mmm`, clamped to the representable
/// range.
pub fn ms_to_timestamp(ms: i64) -> String {
    let ms = engine::clamp_representable(ms, MAX_REPRESENTABLE_MS, "SubRip");
    let t = ms_to_times(ms as f64);
    format!("{:02}:{:02}:{:02},{:03}", t.h, t.m, t.s, t.ms)
}

/// Non-committal format guess for auto-detection.
pub(crate) fn guess(text: &str) -> Option<Format> {
    // The timestamp heuristic below would also fire on SubStation and
    // WebVTT content, so those signatures disqualify us outright.
    if text.contains("[Script Info]") || text.contains("[V4+ Styles]") {
        return None;
    }
    if text.trim_start().starts_with("WEBVTT") {
        return None;
    }
    for line in text.lines() {
        if TIMESTAMP.find_iter(line).count() == 2 {
            return Some(Format::Srt);
        }
    }
    None
}

/// Parse SRT content into a track.
pub fn read(content: &str, opts: &ReadOptions) -> Result<SubtitleTrack, ParseError> {
    engine::read(&SYNTAX, content, opts)
}

/// Write a track as SRT.
pub fn write(track: &SubtitleTrack, opts: &WriteOptions) -> String {
    engine::write(&SYNTAX, track, opts)
}
