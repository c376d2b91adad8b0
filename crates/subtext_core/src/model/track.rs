//! The in-memory subtitle collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::SubtitleEntry;
use super::style::{StyleState, StyleTable, DEFAULT_STYLE_NAME};

/// An ordered collection of subtitle entries plus the styles and script
/// metadata they reference.
///
/// Format readers produce a track; the caller may freely mutate it
/// (shift, re-style, filter) before handing it to a writer. Entries have
/// no identity beyond their position in `events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    /// Subtitle entries in file order.
    pub events: Vec<SubtitleEntry>,
    /// Style table: name to base style.
    #[serde(default)]
    pub styles: StyleTable,
    /// Script-level metadata.
    #[serde(default)]
    pub info: ScriptInfo,
}

impl SubtitleTrack {
    /// Create an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dialogue entries, excluding comments.
    pub fn dialogue_count(&self) -> usize {
        self.events.iter().filter(|e| !e.is_comment()).count()
    }

    /// End of the last entry in milliseconds, 0 for an empty track.
    pub fn duration(&self) -> i64 {
        self.events.iter().map(|e| e.end).max().unwrap_or(0)
    }

    /// Stable sort by the natural `(start, end)` time ordering.
    pub fn sort_by_time(&mut self) {
        self.events.sort_by(SubtitleEntry::cmp_by_time);
    }

    /// Shift every entry by a clock delta, clamping at zero.
    pub fn shift(&mut self, h: f64, m: f64, s: f64, ms: f64) {
        for event in &mut self.events {
            event.shift(h, m, s, ms);
        }
    }

    /// Base style for an entry's style name, falling back to the default
    /// style when the name is unknown.
    pub fn resolve_style(&self, name: &str) -> StyleState {
        self.styles.get(name).cloned().unwrap_or_default()
    }

    /// Insert or replace a style.
    pub fn set_style(&mut self, name: impl Into<String>, style: StyleState) {
        self.styles.insert(name.into(), style);
    }

    /// Ensure the table has a default style, as SubStation players expect.
    pub fn ensure_default_style(&mut self) {
        self.styles
            .entry(DEFAULT_STYLE_NAME.to_string())
            .or_default();
    }
}

/// Script-level metadata carried by SubStation files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptInfo {
    /// Title from `[Script Info]`.
    #[serde(default)]
    pub title: Option<String>,
    /// Script type, e.g. "v4.00+".
    #[serde(default)]
    pub script_type: Option<String>,
    /// Play resolution X.
    #[serde(default)]
    pub play_res_x: Option<i32>,
    /// Play resolution Y.
    #[serde(default)]
    pub play_res_y: Option<i32>,
    /// Wrap style.
    #[serde(default)]
    pub wrap_style: Option<i32>,
    /// Scaled border and shadow.
    #[serde(default)]
    pub scaled_border_and_shadow: Option<bool>,
    /// Any other key/value pairs, preserved verbatim.
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

impl Default for ScriptInfo {
    fn default() -> Self {
        Self {
            title: None,
            script_type: None,
            play_res_x: None,
            play_res_y: None,
            wrap_style: None,
            scaled_border_and_shadow: None,
            custom: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::EntryKind;

    #[test]
    fn dialogue_count_excludes_comments() {
        let mut track = SubtitleTrack::new();
        track.events.push(SubtitleEntry::new(0, 1000, "a"));
        let mut comment = SubtitleEntry::new(500, 800, "b");
        comment.kind = EntryKind::Comment;
        track.events.push(comment);

        assert_eq!(track.events.len(), 2);
        assert_eq!(track.dialogue_count(), 1);
        assert_eq!(track.duration(), 1000);
    }

    #[test]
    fn sort_by_time_is_stable() {
        let mut track = SubtitleTrack::new();
        track.events.push(SubtitleEntry::new(2000, 3000, "late"));
        track.events.push(SubtitleEntry::new(1000, 2000, "first"));
        track.events.push(SubtitleEntry::new(1000, 2000, "second"));
        track.sort_by_time();

        let texts: Vec<&str> = track.events.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "late"]);
    }

    #[test]
    fn resolve_style_falls_back_to_default() {
        let mut track = SubtitleTrack::new();
        let bold = StyleState {
            bold: true,
            ..Default::default()
        };
        track.set_style("Loud", bold.clone());

        assert_eq!(track.resolve_style("Loud"), bold);
        assert_eq!(track.resolve_style("Missing"), StyleState::default());
    }
}
