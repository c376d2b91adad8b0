//! Inline override tag parsing.
//!
//! SubStation text carries styling as `{\...}` override blocks mixed into
//! the literal text. This module turns such a string into an ordered list
//! of [`StyledRun`]s, each pairing a text span with the fully resolved
//! [`StyleState`] in effect for that span.
//!
//! Only the load-bearing tags are interpreted: `\i`, `\b`, `\u`, `\s`,
//! `\p` (drawing mode) and `\r` (reset, optionally to a named style).
//! Anything else inside a block is a no-op; malformed bodies never abort
//! the scan. This leniency is how imperfect real-world files stay
//! convertible.
//!
//! Whitespace tags (`\h`, `\n`) are substituted by the format adapters,
//! not here; the parser stays format-agnostic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{StyleDelta, StyleState, StyleTable};

/// Pattern matching one `{...}` override block.
static OVERRIDE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^}]*\}").expect("valid override block pattern"));

/// A text span with the style resolved for it.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    /// Literal text of the span. When `style.drawing` is set this is a
    /// sequence of drawing commands, not displayable text.
    pub text: String,
    /// Style in effect for the span.
    pub style: StyleState,
}

/// One token of the scanned input.
#[derive(Debug, Clone, PartialEq)]
enum TagToken<'a> {
    /// Literal text outside any override block.
    Literal(&'a str),
    /// Attribute deltas accumulated from one run of recognized tags.
    Directive(StyleDelta),
    /// Style reset, optionally naming a style table entry.
    Reset(Option<&'a str>),
}

/// Remove every `{...}` override block, keeping the literal text.
pub fn strip_override_blocks(text: &str) -> String {
    OVERRIDE_BLOCK.replace_all(text, "").into_owned()
}

/// Parse override-tag markup into styled runs.
///
/// `base` is the entry's own style; `styles` is consulted for named
/// resets only.
///
/// Runs close whenever the resolved style changes. Interior empty runs
/// are suppressed, with one deliberate exception: a directive at the very
/// start of the input emits a single empty run carrying the base style,
/// so the caller still sees the pre-directive state.
pub fn parse_tags(text: &str, base: &StyleState, styles: &StyleTable) -> Vec<StyledRun> {
    let starts_with_directive = OVERRIDE_BLOCK.find(text).is_some_and(|m| m.start() == 0);

    let mut runs: Vec<StyledRun> = Vec::new();
    let mut current = base.clone();
    let mut buf = String::new();

    for token in tokenize(text) {
        match token {
            TagToken::Literal(s) => buf.push_str(s),
            TagToken::Directive(delta) => {
                let next = current.overridden(&delta);
                close_run(&mut runs, &mut buf, &mut current, next, starts_with_directive);
            }
            TagToken::Reset(name) => {
                let target = match name {
                    None => base.clone(),
                    Some(n) => match styles.get(n) {
                        Some(s) => s.clone(),
                        // Resetting to an unknown style is a no-op.
                        None => continue,
                    },
                };
                close_run(&mut runs, &mut buf, &mut current, target, starts_with_directive);
            }
        }
    }

    if runs.is_empty() || !buf.is_empty() {
        runs.push(StyledRun {
            text: buf,
            style: current,
        });
    }
    runs
}

/// Close the current run if the style actually changed.
fn close_run(
    runs: &mut Vec<StyledRun>,
    buf: &mut String,
    current: &mut StyleState,
    next: StyleState,
    starts_with_directive: bool,
) {
    if next == *current {
        return;
    }
    if !buf.is_empty() || (runs.is_empty() && starts_with_directive) {
        runs.push(StyledRun {
            text: std::mem::take(buf),
            style: current.clone(),
        });
    }
    *current = next;
}

/// Split the input into literal spans and directive tokens.
fn tokenize(text: &str) -> Vec<TagToken<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in OVERRIDE_BLOCK.find_iter(text) {
        if m.start() > last {
            tokens.push(TagToken::Literal(&text[last..m.start()]));
        }
        tokenize_block(&text[m.start() + 1..m.end() - 1], &mut tokens);
        last = m.end();
    }
    if last < text.len() {
        tokens.push(TagToken::Literal(&text[last..]));
    }
    tokens
}

/// Scan one block body; tags are backslash-separated.
///
/// Consecutive attribute tags coalesce into one [`StyleDelta`]; a reset
/// flushes whatever came before it so ordering inside the block is
/// preserved (`{\rName\i1}` resets, then overlays italic).
fn tokenize_block<'a>(body: &'a str, tokens: &mut Vec<TagToken<'a>>) {
    let mut delta = StyleDelta::default();

    for tag in body.split('\\') {
        if tag.is_empty() {
            continue;
        }
        if let Some(name) = tag.strip_prefix('r') {
            if !delta.is_empty() {
                tokens.push(TagToken::Directive(delta));
                delta = StyleDelta::default();
            }
            tokens.push(TagToken::Reset(if name.is_empty() { None } else { Some(name) }));
            continue;
        }

        let mut chars = tag.chars();
        let Some(attr) = chars.next() else { continue };
        let arg = chars.as_str();
        match attr {
            'i' => {
                if let Ok(v) = arg.parse::<i64>() {
                    delta.italic = Some(v != 0);
                }
            }
            'b' => {
                if let Ok(v) = arg.parse::<i64>() {
                    delta.bold = Some(v != 0);
                }
            }
            'u' => {
                if let Ok(v) = arg.parse::<i64>() {
                    delta.underline = Some(v != 0);
                }
            }
            's' => {
                if let Ok(v) = arg.parse::<i64>() {
                    delta.strikeout = Some(v != 0);
                }
            }
            'p' => {
                if let Ok(v) = arg.parse::<i64>() {
                    delta.drawing = Some(v > 0);
                }
            }
            // Unrecognized tags are no-ops, never errors.
            _ => {}
        }
    }

    if !delta.is_empty() {
        tokens.push(TagToken::Directive(delta));
    }
}
