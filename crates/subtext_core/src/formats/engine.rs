//! Shared scanning engine for plain timed-text formats.
//!
//! SubRip and WebVTT are the same format at heart: numbered blocks of
//! "timestamp --> timestamp" lines followed by body text. Instead of one
//! format inheriting from the other, both parameterize this engine with a
//! small capability record ([`TimedTextSyntax`]): the timestamp pattern,
//! how to turn a match into milliseconds, how to render milliseconds back,
//! whether visible lines are re-sorted before numbering, and an optional
//! file header.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{ParseError, UnusableContent};
use crate::model::{SubtitleEntry, SubtitleTrack};
use crate::tags::{self, StyledRun};

use super::{ReadOptions, WriteOptions};

/// Capabilities distinguishing one timed-text format from another.
pub(crate) struct TimedTextSyntax {
    /// Pattern matching one timestamp.
    pub timestamp: &'static Lazy<Regex>,
    /// Convert a timestamp match to milliseconds.
    pub parse_timestamp: fn(&Captures) -> i64,
    /// Render milliseconds as the format's timestamp string, clamping
    /// out-of-range values.
    pub format_timestamp: fn(i64) -> String,
    /// Re-sort visible lines by start time before numbering. WebVTT has
    /// no comment concept and must present monotonically.
    pub sort_visible_by_start: bool,
    /// Header emitted before the first entry.
    pub header: Option<&'static str>,
}

static BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").expect("valid blank pattern"));
static BARE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s*$").expect("valid number pattern"));
static TRAILING_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n+ *\d+ *$").expect("valid index pattern"));
static MULTI_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").expect("valid newline pattern"));

/// Read timed text into a track.
///
/// State machine: seek a line carrying exactly two timestamps; that opens
/// an entry and subsequent lines collect into its body until the next
/// timestamp line. End of input closes the last body as-is.
pub(crate) fn read(
    syntax: &TimedTextSyntax,
    content: &str,
    opts: &ReadOptions,
) -> Result<SubtitleTrack, ParseError> {
    let mut spans: Vec<(i64, i64)> = Vec::new();
    let mut bodies: Vec<Vec<&str>> = Vec::new();

    for line in content.lines() {
        let stamps: Vec<Captures> = syntax.timestamp.captures_iter(line).collect();
        if stamps.len() == 2 {
            let start = (syntax.parse_timestamp)(&stamps[0]);
            let end = (syntax.parse_timestamp)(&stamps[1]);
            spans.push((start, end));
            bodies.push(Vec::new());
        } else if let Some(body) = bodies.last_mut() {
            body.push(line);
        }
    }

    let mut track = SubtitleTrack::new();
    for ((start, end), lines) in spans.into_iter().zip(bodies) {
        let text = prepare_text(&lines, opts.keep_markup);
        let mut entry = SubtitleEntry::new(start, end, text);
        if let Some(tagger) = opts.language_tagger {
            entry.language = tagger.tag(&entry.text);
        }
        track.events.push(entry);
    }
    Ok(track)
}

/// Massage a collected body into entry text.
fn prepare_text(lines: &[&str], keep_markup: bool) -> String {
    // Degenerate encoding of an intentionally empty subtitle: blank
    // line(s) followed by the next entry's bare sequence number.
    if lines.len() >= 2
        && lines[..lines.len() - 1].iter().all(|l| BLANK.is_match(l))
        && BARE_NUMBER.is_match(lines[lines.len() - 1])
    {
        return String::new();
    }

    let joined = lines.join("\n");
    let trimmed = joined.trim();
    // Strip the next entry's sequence number when it got collected into
    // this body.
    let text = TRAILING_INDEX.replace(trimmed, "");
    if keep_markup {
        text.into_owned()
    } else {
        strip_html_tags(&text)
    }
}

/// Remove HTML-like tags, keeping the text between them.
fn strip_html_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '<' && chars.peek().is_some_and(|&n| n.is_ascii_alphabetic() || n == '/') {
            in_tag = true;
            continue;
        }
        if c == '>' && in_tag {
            in_tag = false;
            continue;
        }
        if !in_tag {
            result.push(c);
        }
    }
    result
}

/// Write a track as timed text.
pub(crate) fn write(syntax: &TimedTextSyntax, track: &SubtitleTrack, opts: &WriteOptions) -> String {
    let mut out = String::new();
    if let Some(header) = syntax.header {
        out.push_str(header);
        out.push_str("\n\n");
    }

    let mut visible: Vec<&SubtitleEntry> =
        track.events.iter().filter(|e| !e.is_comment()).collect();
    if syntax.sort_visible_by_start {
        visible.sort_by_key(|e| e.start);
    }

    for (number, entry) in visible.iter().enumerate() {
        let start = (syntax.format_timestamp)(entry.start);
        let end = (syntax.format_timestamp)(entry.end);
        let body = prepare_body(entry, track, opts);
        out.push_str(&format!("{}\n{} --> {}\n{}\n\n", number + 1, start, end, body));
    }
    out
}

/// Resolve an entry's markup into the format's native styling.
fn prepare_body(entry: &SubtitleEntry, track: &SubtitleTrack, opts: &WriteOptions) -> String {
    // Whitespace tags are always substituted, independent of styling.
    let text = entry.text.replace(r"\h", " ").replace(r"\n", "\n");

    let mut body = String::new();
    if opts.keep_inline_tags {
        body.push_str(&text);
    } else {
        let base = track.resolve_style(&entry.style);
        for run in tags::parse_tags(&text, &base, &track.styles) {
            match render_run(run, opts.apply_styles) {
                Ok(fragment) => body.push_str(&fragment),
                // A drawing run has no textual rendering; drop the run,
                // keep the rest of the line.
                Err(UnusableContent) => continue,
            }
        }
    }

    MULTI_NEWLINE.replace_all(body.trim(), "\n").into_owned()
}

/// Render one styled run as HTML-like markup.
///
/// Italic, underline and strikeout wrap outward in that order.
fn render_run(run: StyledRun, apply_styles: bool) -> Result<String, UnusableContent> {
    if run.style.drawing {
        return Err(UnusableContent);
    }
    let mut fragment = run.text;
    if apply_styles {
        if run.style.italic {
            fragment = format!("<i>{fragment}</i>");
        }
        if run.style.underline {
            fragment = format!("<u>{fragment}</u>");
        }
        if run.style.strikeout {
            fragment = format!("<s>{fragment}</s>");
        }
    }
    Ok(fragment)
}

/// Clamp a millisecond value to a format's representable range.
///
/// Negative values clamp to zero; overflow clamps to the maximum and
/// logs a recoverable warning instead of failing the conversion.
pub(crate) fn clamp_representable(ms: i64, max: i64, format_name: &str) -> i64 {
    if ms < 0 {
        return 0;
    }
    if ms > max {
        tracing::warn!("{format_name} timestamp overflow, clamping to {max} ms");
        return max;
    }
    ms
}
