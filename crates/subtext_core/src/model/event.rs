//! A single subtitle entry.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::tags;
use crate::times::{times_to_ms, FrameTable, TimeBoundary};

use super::style::{StyleState, StyleTable, DEFAULT_STYLE_NAME};

/// Whether an entry is shown or is an authoring comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryKind {
    /// A visible subtitle line.
    #[default]
    Dialogue,
    /// A comment line, never written by text-only formats.
    Comment,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Dialogue => write!(f, "Dialogue"),
            EntryKind::Comment => write!(f, "Comment"),
        }
    }
}

/// One subtitle line.
///
/// The derived `PartialEq` is full structural equality over every field.
/// Time ordering is deliberately a separate, named operation
/// ([`SubtitleEntry::cmp_by_time`]) keyed on `(start, end)` only, so that
/// sorting and deep comparison can never be confused for one another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    /// Start time in milliseconds.
    pub start: i64,
    /// End time in milliseconds.
    pub end: i64,
    /// Text with inline SubStation override tags.
    pub text: String,
    /// Style name.
    #[serde(default)]
    pub style: String,
    /// Dialogue or comment.
    #[serde(default)]
    pub kind: EntryKind,
    /// Layer number, 0 is the lowest layer.
    #[serde(default)]
    pub layer: i32,
    /// Actor name.
    #[serde(default)]
    pub name: String,
    /// Left margin override.
    #[serde(default)]
    pub margin_l: i32,
    /// Right margin override.
    #[serde(default)]
    pub margin_r: i32,
    /// Vertical margin override.
    #[serde(default)]
    pub margin_v: i32,
    /// Line effect.
    #[serde(default)]
    pub effect: String,
    /// Marked flag (SSA only).
    #[serde(default)]
    pub marked: bool,
    /// Detected language tag, when a language tagger was supplied.
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for SubtitleEntry {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            text: String::new(),
            style: DEFAULT_STYLE_NAME.to_string(),
            kind: EntryKind::Dialogue,
            layer: 0,
            name: String::new(),
            margin_l: 0,
            margin_r: 0,
            margin_v: 0,
            effect: String::new(),
            marked: false,
            language: None,
        }
    }
}

impl SubtitleEntry {
    /// Create a new dialogue entry.
    pub fn new(start: i64, end: i64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create with a style name.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Subtitle duration in milliseconds.
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Adjust the end time so the entry lasts `ms` milliseconds.
    ///
    /// Negative durations are rejected.
    pub fn set_duration(&mut self, ms: i64) -> Result<(), ParamError> {
        if ms < 0 {
            return Err(ParamError::NegativeDuration);
        }
        self.end = self.start + ms;
        Ok(())
    }

    /// True when the entry is a comment.
    pub fn is_comment(&self) -> bool {
        self.kind == EntryKind::Comment
    }

    /// Mark the entry as a comment or as dialogue.
    pub fn set_comment(&mut self, comment: bool) {
        self.kind = if comment {
            EntryKind::Comment
        } else {
            EntryKind::Dialogue
        };
    }

    /// Natural time ordering over `(start, end)`; every other field is
    /// excluded on purpose.
    pub fn cmp_by_time(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    /// The `(start, end)` key used by [`SubtitleEntry::cmp_by_time`].
    pub fn sort_key(&self) -> (i64, i64) {
        (self.start, self.end)
    }

    /// True when both entries occupy the same time span, regardless of
    /// text or any other field.
    pub fn same_timing(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }

    /// Shift start and end by a clock delta, clamping at zero.
    pub fn shift(&mut self, h: f64, m: f64, s: f64, ms: f64) {
        let delta = times_to_ms(h, m, s, ms);
        self.start = (self.start + delta).max(0);
        self.end = (self.end + delta).max(0);
    }

    /// Shift by a whole number of frames under a frame table.
    ///
    /// Start times use start-boundary semantics and end times use
    /// end-boundary semantics. A shifted time that falls outside the
    /// table's domain clamps to zero.
    pub fn shift_frames(&mut self, frames: i64, table: &FrameTable) {
        let start_frame = table.ms_to_frame(self.start, TimeBoundary::Start);
        let end_frame = table.ms_to_frame(self.end, TimeBoundary::End);
        if let (Ok(sf), Ok(ef)) = (start_frame, end_frame) {
            self.start = table
                .frame_to_ms(sf + frames, TimeBoundary::Start)
                .unwrap_or(0)
                .max(0);
            self.end = table
                .frame_to_ms(ef + frames, TimeBoundary::End)
                .unwrap_or(0)
                .max(0);
        }
    }

    /// Text with override blocks removed and whitespace tags substituted.
    ///
    /// `\h` becomes a space and `\n` a newline; `\N` is left alone, the
    /// format writers decide what a hard line break means for them.
    pub fn plaintext(&self) -> String {
        let stripped = tags::strip_override_blocks(&self.text);
        stripped.replace(r"\h", " ").replace(r"\n", "\n")
    }

    /// True when any run of the entry's text is in drawing mode.
    pub fn is_drawing(&self) -> bool {
        let table = StyleTable::new();
        tags::parse_tags(&self.text, &StyleState::default(), &table)
            .iter()
            .any(|run| run.style.drawing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_setter_rejects_negative() {
        let mut entry = SubtitleEntry::new(1000, 2000, "Test");
        assert_eq!(entry.duration(), 1000);

        entry.set_duration(500).unwrap();
        assert_eq!(entry.end, 1500);

        assert_eq!(entry.set_duration(-1), Err(ParamError::NegativeDuration));
        assert_eq!(entry.end, 1500);
    }

    #[test]
    fn ordering_is_not_deep_equality() {
        let a = SubtitleEntry::new(1000, 2000, "Hi");
        let b = SubtitleEntry::new(1000, 2000, "Bye");
        // Same position on the timeline, different content.
        assert!(a.same_timing(&b));
        assert_eq!(a.cmp_by_time(&b), Ordering::Equal);
        assert_ne!(a, b);

        let c = SubtitleEntry::new(500, 2000, "Hi");
        assert_eq!(c.cmp_by_time(&a), Ordering::Less);
    }

    #[test]
    fn shift_clamps_at_zero() {
        let mut entry = SubtitleEntry::new(1000, 2000, "Test");
        entry.shift(0.0, 0.0, 0.0, 500.0);
        assert_eq!((entry.start, entry.end), (1500, 2500));

        entry.shift(0.0, 0.0, -2.0, 0.0);
        assert_eq!((entry.start, entry.end), (0, 500));
    }

    #[test]
    fn shift_frames_moves_along_the_table() {
        let table = FrameTable::from_fps(25.0).unwrap();
        let mut entry = SubtitleEntry::new(1000, 2000, "Test");
        entry.shift_frames(25, &table);
        assert_eq!(entry.start, 2000);
        // End boundary: last millisecond before the next frame start.
        assert_eq!(entry.end, 2999);
    }

    #[test]
    fn plaintext_strips_blocks_and_substitutes_whitespace() {
        let entry = SubtitleEntry::new(0, 1000, r"{\i1}Hello\h{\i0}world\nbye");
        assert_eq!(entry.plaintext(), "Hello world\nbye");
    }

    #[test]
    fn drawing_detection() {
        let drawing = SubtitleEntry::new(0, 1000, r"{\p1}m 0 0 l 100 0{\p0}");
        assert!(drawing.is_drawing());

        let plain = SubtitleEntry::new(0, 1000, "Hello");
        assert!(!plain.is_drawing());
    }
}
