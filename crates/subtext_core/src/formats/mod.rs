//! Subtitle formats: identifiers, auto-detection, and read/write dispatch.
//!
//! Each adapter exposes a reader, a writer and a non-committal `guess`
//! used by [`detect`]. Detection is strict three-way: exactly one distinct
//! positive guess wins, zero fails with
//! [`DetectError::NoFormatDetected`], several fail with
//! [`DetectError::Ambiguous`]. It never picks a "most likely" winner.

mod engine;
pub mod microdvd;
pub mod subrip;
pub mod substation;
pub mod webvtt;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{DetectError, SubtitleError};
use crate::model::SubtitleTrack;

/// Identifier of a supported subtitle format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// SubRip (.srt)
    Srt,
    /// Advanced SubStation Alpha (.ass)
    Ass,
    /// SubStation Alpha (.ssa)
    Ssa,
    /// WebVTT (.vtt)
    Vtt,
    /// MicroDVD (.sub), frame-based
    MicroDvd,
}

impl Format {
    /// Map a file extension (with or without the leading dot) to a format.
    pub fn from_extension(ext: &str) -> Result<Self, SubtitleError> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "ass" => Ok(Self::Ass),
            "ssa" => Ok(Self::Ssa),
            "vtt" => Ok(Self::Vtt),
            "sub" => Ok(Self::MicroDvd),
            _ => Err(SubtitleError::UnknownExtension(ext.to_string())),
        }
    }

    /// The typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ass => "ass",
            Self::Ssa => "ssa",
            Self::Vtt => "vtt",
            Self::MicroDvd => "sub",
        }
    }

    /// Map a format identifier string to a format.
    pub fn from_identifier(id: &str) -> Result<Self, SubtitleError> {
        match id {
            "srt" => Ok(Self::Srt),
            "ass" => Ok(Self::Ass),
            "ssa" => Ok(Self::Ssa),
            "vtt" => Ok(Self::Vtt),
            "microdvd" => Ok(Self::MicroDvd),
            _ => Err(SubtitleError::UnknownFormat(id.to_string())),
        }
    }

    /// The identifier string for this format.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Ass => "ass",
            Self::Ssa => "ssa",
            Self::Vtt => "vtt",
            Self::MicroDvd => "microdvd",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Caller-supplied language identification capability.
///
/// The detector behind this is an external collaborator (typically a
/// third-party model); passing it in explicitly keeps the readers free of
/// hidden global state and trivially testable without the model present.
pub trait LanguageTagger {
    /// Identify the language of a text fragment, e.g. returning an ISO
    /// 639-1 code. `None` when identification fails or is inconclusive.
    fn tag(&self, text: &str) -> Option<String>;
}

/// Options consumed by format readers.
#[derive(Clone, Copy, Default)]
pub struct ReadOptions<'a> {
    /// Keep HTML-like markup in body text instead of stripping it.
    pub keep_markup: bool,
    /// Frame rate for frame-based formats.
    pub fps: Option<f64>,
    /// Optional language identification capability; detected tags land in
    /// [`crate::model::SubtitleEntry::language`].
    pub language_tagger: Option<&'a dyn LanguageTagger>,
}

impl std::fmt::Debug for ReadOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadOptions")
            .field("keep_markup", &self.keep_markup)
            .field("fps", &self.fps)
            .field("language_tagger", &self.language_tagger.is_some())
            .finish()
    }
}

/// Options consumed by format writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Resolve line styles and override tags into target-format markup.
    /// When false, styling is dropped and only plain text is written.
    #[serde(default = "default_true")]
    pub apply_styles: bool,
    /// Pass inline override tags through verbatim instead of converting
    /// them. Whitespace tags are still substituted.
    #[serde(default)]
    pub keep_inline_tags: bool,
    /// Frame rate for frame-based formats.
    #[serde(default)]
    pub fps: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            apply_styles: true,
            keep_inline_tags: false,
            fps: None,
        }
    }
}

/// Auto-detect the format of a text fragment.
///
/// Collects every adapter's guess and requires exactly one distinct
/// positive answer.
pub fn detect(text: &str) -> Result<Format, DetectError> {
    let guessers: [fn(&str) -> Option<Format>; 4] = [
        subrip::guess,
        webvtt::guess,
        substation::guess,
        microdvd::guess,
    ];

    let mut guesses = BTreeSet::new();
    for guess in guessers {
        if let Some(format) = guess(text) {
            guesses.insert(format);
        }
    }

    let candidates: Vec<Format> = guesses.into_iter().collect();
    match candidates.as_slice() {
        [] => Err(DetectError::NoFormatDetected),
        [single] => Ok(*single),
        _ => Err(DetectError::Ambiguous(candidates)),
    }
}

/// Parse subtitle content in the given format.
pub fn read(
    content: &str,
    format: Format,
    opts: &ReadOptions,
) -> Result<SubtitleTrack, SubtitleError> {
    match format {
        Format::Srt => Ok(subrip::read(content, opts)?),
        Format::Vtt => Ok(webvtt::read(content, opts)?),
        Format::Ass | Format::Ssa => Ok(substation::read(content)?),
        Format::MicroDvd => microdvd::read(content, opts),
    }
}

/// Write a track in the given format.
pub fn write(
    track: &SubtitleTrack,
    format: Format,
    opts: &WriteOptions,
) -> Result<String, SubtitleError> {
    match format {
        Format::Srt => Ok(subrip::write(track, opts)),
        Format::Vtt => Ok(webvtt::write(track, opts)),
        Format::Ass | Format::Ssa => Ok(substation::write(track, opts)),
        Format::MicroDvd => microdvd::write(track, opts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_and_identifier_lookups() {
        assert_eq!(Format::from_extension(".srt").unwrap(), Format::Srt);
        assert_eq!(Format::from_extension("VTT").unwrap(), Format::Vtt);
        assert_eq!(Format::from_extension(".sub").unwrap(), Format::MicroDvd);
        assert!(matches!(
            Format::from_extension(".xyz"),
            Err(SubtitleError::UnknownExtension(_))
        ));

        assert_eq!(Format::from_identifier("microdvd").unwrap(), Format::MicroDvd);
        assert!(matches!(
            Format::from_identifier("nope"),
            Err(SubtitleError::UnknownFormat(_))
        ));

        for format in [Format::Srt, Format::Ass, Format::Ssa, Format::Vtt, Format::MicroDvd] {
            assert_eq!(Format::from_identifier(format.identifier()).unwrap(), format);
            assert_eq!(Format::from_extension(format.extension()).unwrap(), format);
        }
    }

    #[test]
    fn detect_unique_format() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello\n";
        assert_eq!(detect(srt).unwrap(), Format::Srt);

        let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nHello\n";
        assert_eq!(detect(vtt).unwrap(), Format::Vtt);

        let ass = "[Script Info]\nTitle: x\n\n[V4+ Styles]\n";
        assert_eq!(detect(ass).unwrap(), Format::Ass);

        let microdvd = "{0}{25}Hello\n";
        assert_eq!(detect(microdvd).unwrap(), Format::MicroDvd);
    }

    #[test]
    fn detect_empty_input_fails() {
        assert_eq!(detect(""), Err(DetectError::NoFormatDetected));
        assert_eq!(detect("just some prose"), Err(DetectError::NoFormatDetected));
    }

    #[test]
    fn detect_conflicting_signatures_is_ambiguous() {
        // An SSA section header the SubRip adapter does not disqualify
        // itself on, plus a SubRip timestamp line: two distinct guesses.
        let text = "[V4 Styles]\n1\n00:00:01,000 --> 00:00:04,000\nHello\n";
        match detect(text) {
            Err(DetectError::Ambiguous(candidates)) => {
                assert!(candidates.contains(&Format::Srt));
                assert!(candidates.contains(&Format::Ssa));
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn detect_never_picks_a_winner_by_majority() {
        // SubStation disqualifies SubRip via its own signature check, so
        // this stays unique despite the timestamp lines.
        let text = "[Script Info]\n\n[V4+ Styles]\n\n[Events]\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hi\n";
        assert_eq!(detect(text).unwrap(), Format::Ass);
    }

    #[test]
    fn language_tagger_is_injected() {
        struct FixedTagger;
        impl LanguageTagger for FixedTagger {
            fn tag(&self, _text: &str) -> Option<String> {
                Some("en".to_string())
            }
        }

        let opts = ReadOptions {
            language_tagger: Some(&FixedTagger),
            ..Default::default()
        };
        let track = read("1\n00:00:01,000 --> 00:00:02,000\nHello\n", Format::Srt, &opts).unwrap();
        assert_eq!(track.events[0].language.as_deref(), Some("en"));
    }

    #[test]
    fn write_options_serde_round_trip() {
        let opts = WriteOptions {
            apply_styles: false,
            keep_inline_tags: true,
            fps: Some(23.976),
        };
        let json = serde_json::to_string(&opts).unwrap();
        let back: WriteOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back.apply_styles, opts.apply_styles);
        assert_eq!(back.keep_inline_tags, opts.keep_inline_tags);
        assert_eq!(back.fps, opts.fps);

        // Missing fields fall back to the defaults.
        let back: WriteOptions = serde_json::from_str("{}").unwrap();
        assert!(back.apply_styles);
        assert!(!back.keep_inline_tags);
    }

    #[test]
    fn cross_format_conversion() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello\n\n2\n00:00:05,000 --> 00:00:08,000\nWorld\n";
        let format = detect(srt).unwrap();
        let track = read(srt, format, &ReadOptions::default()).unwrap();

        let vtt = write(&track, Format::Vtt, &WriteOptions::default()).unwrap();
        assert!(vtt.starts_with("WEBVTT\n"));
        assert!(vtt.contains("00:00:01.000 --> 00:00:04.000"));

        let back = read(&vtt, Format::Vtt, &ReadOptions::default()).unwrap();
        assert_eq!(track.events, back.events);
    }
}
