//! WebVTT format adapter.
//!
//! Shares the scanning engine with SubRip; the differences are the
//! timestamp shape (`[H+:]MM:SS.mmm`, hours optional, `.` separator),
//! the `WEBVTT` header, and the ordering policy: WebVTT has no comment
//! concept and must present cues monotonically, so visible lines are
//! re-sorted by start time before numbering.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ParseError;
use crate::model::SubtitleTrack;

use super::engine::{self, TimedTextSyntax};
use super::{subrip, Format, ReadOptions, WriteOptions};

/// WebVTT timestamp: optional hours, two-digit minutes and seconds, a
/// 2-3 digit fraction.
static VTT_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{0,4}:)?(\d{2}):(\d{2})\.(\d{2,3})").expect("valid WebVTT timestamp pattern")
});

static SYNTAX: TimedTextSyntax = TimedTextSyntax {
    timestamp: &VTT_TIMESTAMP,
    parse_timestamp: timestamp_to_ms,
    format_timestamp: ms_to_timestamp,
    sort_visible_by_start: true,
    header: Some("WEBVTT"),
};

/// Convert a [`VTT_TIMESTAMP`] match to milliseconds.
///
/// A two-digit fraction is centiseconds and scales accordingly.
fn timestamp_to_ms(caps: &Captures) -> i64 {
    let h: i64 = caps
        .get(1)
        .and_then(|m| m.as_str().trim_end_matches(':').parse().ok())
        .unwrap_or(0);
    let m: i64 = caps[2].parse().unwrap_or(0);
    let s: i64 = caps[3].parse().unwrap_or(0);
    let frac = &caps[4];
    let ms: i64 = frac.parse::<i64>().unwrap_or(0) * 10i64.pow(3 - frac.len() as u32);
    ms + s * 1000 + m * 60_000 + h * 3_600_000
}

/// Render milliseconds as a WebVTT timestamp.
pub fn ms_to_timestamp(ms: i64) -> String {
    subrip::ms_to_timestamp(ms).replace(',', ".")
}

/// Non-committal format guess for auto-detection.
pub(crate) fn guess(text: &str) -> Option<Format> {
    if text.trim_start().starts_with("WEBVTT") {
        Some(Format::Vtt)
    } else {
        None
    }
}

/// Parse WebVTT content into a track.
pub fn read(content: &str, opts: &ReadOptions) -> Result<SubtitleTrack, ParseError> {
    engine::read(&SYNTAX, content, opts)
}

/// Write a track as WebVTT.
pub fn write(track: &SubtitleTrack, opts: &WriteOptions) -> String {
    engine::write(&SYNTAX, track, opts)
}
