//! Core data types: entries, styles, and the subtitle collection.

mod event;
mod style;
mod track;

pub use event::{EntryKind, SubtitleEntry};
pub use style::{Color, StyleDelta, StyleState, StyleTable, DEFAULT_STYLE_NAME};
pub use track::{ScriptInfo, SubtitleTrack};
