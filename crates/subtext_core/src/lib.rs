//! SubText core - subtitle format conversion.
//!
//! This crate converts subtitle data between line-oriented text formats
//! (SubRip, WebVTT, SubStation, MicroDVD) while preserving timing
//! accuracy and inline text styling. It contains no UI and no
//! process-level I/O surface; the only filesystem touchpoints are the
//! optional [`load_path`]/[`save_path`] conveniences.
//!
//! # Components
//!
//! - **times**: millisecond/clock/frame conversions with exact rounding
//!   and clamping rules
//! - **tags**: the inline override-tag engine turning `{\...}` markup
//!   into styled runs
//! - **model**: entries, styles and the subtitle collection
//! - **formats**: format adapters, auto-detection and dispatch
//!
//! # Usage
//!
//! ```
//! use subtext_core::{detect, read, write, Format, ReadOptions, WriteOptions};
//!
//! let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello\n";
//! let format = detect(srt)?;
//! assert_eq!(format, Format::Srt);
//!
//! let mut track = read(srt, format, &ReadOptions::default())?;
//! track.shift(0.0, 0.0, 1.5, 0.0);
//!
//! let vtt = write(&track, Format::Vtt, &WriteOptions::default())?;
//! assert!(vtt.starts_with("WEBVTT"));
//! # Ok::<(), subtext_core::SubtitleError>(())
//! ```

pub mod error;
pub mod formats;
pub mod logging;
pub mod model;
pub mod tags;
pub mod times;

use std::fs;
use std::path::Path;

// Re-export the core types and entry points.
pub use error::{DetectError, OutOfRange, ParamError, ParseError, SubtitleError, UnusableContent};
pub use formats::{detect, read, write, Format, LanguageTagger, ReadOptions, WriteOptions};
pub use model::{
    Color, EntryKind, ScriptInfo, StyleDelta, StyleState, StyleTable, SubtitleEntry, SubtitleTrack,
};
pub use tags::{parse_tags, StyledRun};
pub use times::{FrameTable, TimeBoundary};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Load a subtitle file from disk.
///
/// The format comes from the file extension, falling back to content
/// detection. Input must be UTF-8; a byte order mark is stripped.
pub fn load_path(path: impl AsRef<Path>, opts: &ReadOptions) -> Result<SubtitleTrack, SubtitleError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SubtitleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let content = content.trim_start_matches('\u{feff}');

    let format = match extension_format(path) {
        Some(format) => format,
        None => detect(content)?,
    };
    read(content, format, opts)
}

/// Write a track to disk.
///
/// `format` overrides the file extension when given; otherwise the
/// extension decides.
pub fn save_path(
    track: &SubtitleTrack,
    path: impl AsRef<Path>,
    format: Option<Format>,
    opts: &WriteOptions,
) -> Result<(), SubtitleError> {
    let path = path.as_ref();
    let format = match format.or_else(|| extension_format(path)) {
        Some(format) => format,
        None => {
            return Err(SubtitleError::UnknownExtension(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string(),
            ))
        }
    };

    let content = write(track, format, opts)?;
    fs::write(path, content).map_err(|source| SubtitleError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Format from a path's extension, if recognizable.
fn extension_format(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?;
    Format::from_extension(ext).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }

    #[test]
    fn load_and_save_round_trip() {
        let content = "1\n00:00:01,000 --> 00:00:04,000\nHello, world!\n";
        let mut input = NamedTempFile::with_suffix(".srt").unwrap();
        input.write_all(content.as_bytes()).unwrap();

        let track = load_path(input.path(), &ReadOptions::default()).unwrap();
        assert_eq!(track.events.len(), 1);
        assert_eq!(track.events[0].text, "Hello, world!");

        let output = NamedTempFile::with_suffix(".vtt").unwrap();
        save_path(&track, output.path(), None, &WriteOptions::default()).unwrap();

        let converted = load_path(output.path(), &ReadOptions::default()).unwrap();
        assert_eq!(track.events, converted.events);
    }

    #[test]
    fn load_detects_format_without_known_extension() {
        let content = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHi\n";
        let mut input = NamedTempFile::with_suffix(".txt").unwrap();
        input.write_all(content.as_bytes()).unwrap();

        let track = load_path(input.path(), &ReadOptions::default()).unwrap();
        assert_eq!(track.events.len(), 1);
    }

    #[test]
    fn load_strips_byte_order_mark() {
        let content = "\u{feff}1\n00:00:01,000 --> 00:00:02,000\nHi\n";
        let mut input = NamedTempFile::with_suffix(".srt").unwrap();
        input.write_all(content.as_bytes()).unwrap();

        let track = load_path(input.path(), &ReadOptions::default()).unwrap();
        assert_eq!(track.events[0].text, "Hi");
    }

    #[test]
    fn save_without_format_or_extension_fails() {
        let track = SubtitleTrack::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noext");
        assert!(matches!(
            save_path(&track, &path, None, &WriteOptions::default()),
            Err(SubtitleError::UnknownExtension(_))
        ));
    }

    #[test]
    fn end_to_end_subrip_round_trip() {
        // Two entries, written then re-read, equal under full structural
        // equality.
        let mut track = SubtitleTrack::new();
        track.events.push(SubtitleEntry::new(1000, 2000, "Hi"));
        track.events.push(SubtitleEntry::new(3000, 4500, "Bye"));

        let written = write(&track, Format::Srt, &WriteOptions::default()).unwrap();
        let reread = read(&written, Format::Srt, &ReadOptions::default()).unwrap();
        assert_eq!(track.events, reread.events);
    }
}
