//! SubStation (.ass/.ssa) format adapter.
//!
//! # Format Overview
//!
//! SubStation files have three main sections:
//! - `[Script Info]`: metadata (title, resolution, etc.)
//! - `[V4+ Styles]` or `[V4 Styles]`: style definitions
//! - `[Events]`: dialogue and comment lines
//!
//! Timestamps are `H:MM:SS.cc` (centiseconds). Entry text keeps its
//! inline override tags verbatim; resolving them is the tag parser's job
//! at conversion time.

use crate::error::ParseError;
use crate::model::{
    Color, EntryKind, ScriptInfo, StyleState, SubtitleEntry, SubtitleTrack, DEFAULT_STYLE_NAME,
};
use crate::times::{ms_to_times, timestamp_to_ms, TIMESTAMP};

use super::engine;
use super::{Format, WriteOptions};

/// Largest timestamp SubStation can express: 9:59:59.99.
pub const MAX_REPRESENTABLE_MS: i64 = 10 * 3_600_000 - 10;

/// Parse a SubStation timestamp (`H:MM:SS.cc`) to milliseconds.
pub fn parse_timestamp(s: &str) -> Option<i64> {
    TIMESTAMP.captures(s.trim()).map(|caps| timestamp_to_ms(&caps))
}

/// Render milliseconds as `H:MM:SS.cc`, clamped to the representable
/// range.
pub fn ms_to_timestamp(ms: i64) -> String {
    let ms = engine::clamp_representable(ms, MAX_REPRESENTABLE_MS, "SubStation");
    let t = ms_to_times(ms as f64);
    format!("{}:{:02}:{:02}.{:02}", t.h, t.m, t.s, t.ms / 10)
}

/// Non-committal format guess for auto-detection.
pub(crate) fn guess(text: &str) -> Option<Format> {
    if text.contains("V4+ Styles") {
        Some(Format::Ass)
    } else if text.contains("V4 Styles") {
        Some(Format::Ssa)
    } else if text.contains("[Script Info]") {
        Some(Format::Ass)
    } else {
        None
    }
}

/// Parse SubStation content into a track.
pub fn read(content: &str) -> Result<SubtitleTrack, ParseError> {
    let mut track = SubtitleTrack::new();
    let mut current_section = String::new();
    let mut style_format: Vec<String> = Vec::new();
    let mut event_format: Vec<String> = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim_start_matches('\u{feff}').trim();

        if line.is_empty() {
            continue;
        }

        // Section header
        if line.starts_with('[') && line.ends_with(']') {
            current_section = line[1..line.len() - 1].to_lowercase();
            continue;
        }

        // Comment lines
        if line.starts_with(';') || line.starts_with('!') {
            continue;
        }

        match current_section.as_str() {
            "script info" => parse_info_line(line, &mut track.info),
            "v4+ styles" | "v4 styles" => {
                if let Some(rest) = line.strip_prefix("Format:") {
                    style_format = parse_format_line(rest);
                } else if let Some(rest) = line.strip_prefix("Style:") {
                    let format = if style_format.is_empty() {
                        default_style_format()
                    } else {
                        style_format.clone()
                    };
                    let (name, style) = parse_style_line(rest, &format, line_num)?;
                    track.styles.insert(name, style);
                }
            }
            "events" => {
                if let Some(rest) = line.strip_prefix("Format:") {
                    event_format = parse_format_line(rest);
                } else {
                    let (kind, rest) = if let Some(rest) = line.strip_prefix("Dialogue:") {
                        (EntryKind::Dialogue, rest)
                    } else if let Some(rest) = line.strip_prefix("Comment:") {
                        (EntryKind::Comment, rest)
                    } else {
                        continue;
                    };
                    let format = if event_format.is_empty() {
                        default_event_format()
                    } else {
                        event_format.clone()
                    };
                    let entry = parse_event_line(rest, &format, kind, line_num)?;
                    track.events.push(entry);
                }
            }
            _ => {
                // Unknown section: preserve the raw key/value pairs.
                if let Some((key, value)) = line.split_once(':') {
                    track
                        .info
                        .custom
                        .insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        }
    }

    track.ensure_default_style();
    Ok(track)
}

/// Parse a `Format:` line into lowercase field names.
fn parse_format_line(rest: &str) -> Vec<String> {
    rest.split(',').map(|s| s.trim().to_lowercase()).collect()
}

/// Parse one `[Script Info]` line.
fn parse_info_line(line: &str, info: &mut ScriptInfo) {
    let Some((key, value)) = line.split_once(':') else {
        return;
    };

    let key = key.trim().to_lowercase();
    let value = value.trim();

    match key.as_str() {
        "title" => info.title = Some(value.to_string()),
        "scripttype" => info.script_type = Some(value.to_string()),
        "playresx" => info.play_res_x = value.parse().ok(),
        "playresy" => info.play_res_y = value.parse().ok(),
        "wrapstyle" => info.wrap_style = value.parse().ok(),
        "scaledborderandshadow" => {
            info.scaled_border_and_shadow = Some(value.eq_ignore_ascii_case("yes") || value == "1")
        }
        _ => {
            info.custom.insert(key, value.to_string());
        }
    }
}

/// Parse a `Style:` line body against the field list.
fn parse_style_line(
    rest: &str,
    format: &[String],
    line_num: usize,
) -> Result<(String, StyleState), ParseError> {
    let fields: Vec<&str> = rest.trim().split(',').collect();
    if fields.len() < format.len() {
        return Err(ParseError::invalid_style(
            line_num,
            format!("expected {} fields, got {}", format.len(), fields.len()),
        ));
    }

    let mut name = DEFAULT_STYLE_NAME.to_string();
    let mut style = StyleState::default();

    for (i, field_name) in format.iter().enumerate() {
        let value = fields.get(i).map(|s| s.trim()).unwrap_or("");

        match field_name.as_str() {
            "name" => name = value.to_string(),
            "fontname" => style.fontname = value.to_string(),
            "fontsize" => style.fontsize = value.parse().unwrap_or(20.0),
            "primarycolour" => {
                style.primary_color = Color::from_substation(value).unwrap_or_default()
            }
            "secondarycolour" => {
                style.secondary_color = Color::from_substation(value).unwrap_or_default()
            }
            "outlinecolour" | "tertiarycolour" => {
                style.outline_color = Color::from_substation(value).unwrap_or_default()
            }
            "backcolour" => style.back_color = Color::from_substation(value).unwrap_or_default(),
            "bold" => style.bold = value == "-1" || value == "1",
            "italic" => style.italic = value == "-1" || value == "1",
            "underline" => style.underline = value == "-1" || value == "1",
            "strikeout" => style.strikeout = value == "-1" || value == "1",
            "scalex" => style.scale_x = value.parse().unwrap_or(100.0),
            "scaley" => style.scale_y = value.parse().unwrap_or(100.0),
            "spacing" => style.spacing = value.parse().unwrap_or(0.0),
            "angle" => style.angle = value.parse().unwrap_or(0.0),
            "borderstyle" => style.border_style = value.parse().unwrap_or(1),
            "outline" => style.outline = value.parse().unwrap_or(2.0),
            "shadow" => style.shadow = value.parse().unwrap_or(2.0),
            "alignment" => style.alignment = value.parse().unwrap_or(2),
            "marginl" => style.margin_l = value.parse().unwrap_or(10),
            "marginr" => style.margin_r = value.parse().unwrap_or(10),
            "marginv" => style.margin_v = value.parse().unwrap_or(10),
            "encoding" => style.encoding = value.parse().unwrap_or(1),
            _ => {}
        }
    }

    Ok((name, style))
}

/// Parse a `Dialogue:`/`Comment:` line body against the field list.
fn parse_event_line(
    rest: &str,
    format: &[String],
    kind: EntryKind,
    line_num: usize,
) -> Result<SubtitleEntry, ParseError> {
    let content = rest.trim();

    // The text field is last and may contain commas; split only up to it.
    let text_index = format.iter().position(|f| f == "text").unwrap_or(9);
    let parts: Vec<&str> = content.splitn(text_index + 1, ',').collect();
    if parts.len() < text_index {
        return Err(ParseError::invalid_event(
            line_num,
            format!("expected at least {} fields", text_index),
        ));
    }

    let mut entry = SubtitleEntry {
        kind,
        ..Default::default()
    };

    for (i, field_name) in format.iter().enumerate() {
        let value = parts.get(i).map(|s| s.trim()).unwrap_or("");

        match field_name.as_str() {
            "layer" => entry.layer = value.parse().unwrap_or(0),
            "marked" => {
                let flag = value.rsplit('=').next().unwrap_or("0");
                entry.marked = flag == "1" || flag == "-1";
            }
            "start" => {
                entry.start = parse_timestamp(value)
                    .ok_or_else(|| ParseError::invalid_time(line_num, value))?;
            }
            "end" => {
                entry.end = parse_timestamp(value)
                    .ok_or_else(|| ParseError::invalid_time(line_num, value))?;
            }
            "style" => entry.style = value.to_string(),
            "name" | "actor" => entry.name = value.to_string(),
            "marginl" => entry.margin_l = value.parse().unwrap_or(0),
            "marginr" => entry.margin_r = value.parse().unwrap_or(0),
            "marginv" => entry.margin_v = value.parse().unwrap_or(0),
            "effect" => entry.effect = value.to_string(),
            "text" => entry.text = parts.get(i).unwrap_or(&"").to_string(),
            _ => {}
        }
    }

    Ok(entry)
}

/// Write a track as SubStation V4+.
///
/// Comments survive here, unlike in the text-only formats; SSA input is
/// normalized to V4+ on output.
pub fn write(track: &SubtitleTrack, _opts: &WriteOptions) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    if let Some(title) = &track.info.title {
        out.push_str(&format!("Title: {title}\n"));
    }
    let script_type = track.info.script_type.as_deref().unwrap_or("v4.00+");
    out.push_str(&format!("ScriptType: {script_type}\n"));
    if let Some(wrap) = track.info.wrap_style {
        out.push_str(&format!("WrapStyle: {wrap}\n"));
    }
    if let Some(scaled) = track.info.scaled_border_and_shadow {
        let value = if scaled { "yes" } else { "no" };
        out.push_str(&format!("ScaledBorderAndShadow: {value}\n"));
    }
    if let Some(x) = track.info.play_res_x {
        out.push_str(&format!("PlayResX: {x}\n"));
    }
    if let Some(y) = track.info.play_res_y {
        out.push_str(&format!("PlayResY: {y}\n"));
    }
    for (key, value) in &track.info.custom {
        out.push_str(&format!("{key}: {value}\n"));
    }
    out.push('\n');

    out.push_str("[V4+ Styles]\n");
    out.push_str("Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n");
    for (name, style) in &track.styles {
        out.push_str(&format!(
            "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            name,
            style.fontname,
            fmt_float(style.fontsize),
            style.primary_color.to_substation(),
            style.secondary_color.to_substation(),
            style.outline_color.to_substation(),
            style.back_color.to_substation(),
            fmt_flag(style.bold),
            fmt_flag(style.italic),
            fmt_flag(style.underline),
            fmt_flag(style.strikeout),
            fmt_float(style.scale_x),
            fmt_float(style.scale_y),
            fmt_float(style.spacing),
            fmt_float(style.angle),
            style.border_style,
            fmt_float(style.outline),
            fmt_float(style.shadow),
            style.alignment,
            style.margin_l,
            style.margin_r,
            style.margin_v,
            style.encoding,
        ));
    }
    out.push('\n');

    out.push_str("[Events]\n");
    out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");
    for entry in &track.events {
        out.push_str(&format!(
            "{}: {},{},{},{},{},{},{},{},{},{}\n",
            entry.kind,
            entry.layer,
            ms_to_timestamp(entry.start),
            ms_to_timestamp(entry.end),
            entry.style,
            entry.name,
            entry.margin_l,
            entry.margin_r,
            entry.margin_v,
            entry.effect,
            entry.text,
        ));
    }

    out
}

/// Render a float the way SubStation files usually carry them: no
/// trailing `.0` for whole numbers.
fn fmt_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn fmt_flag(value: bool) -> &'static str {
    if value {
        "-1"
    } else {
        "0"
    }
}

/// Default style field order for `[V4+ Styles]`.
fn default_style_format() -> Vec<String> {
    [
        "name",
        "fontname",
        "fontsize",
        "primarycolour",
        "secondarycolour",
        "outlinecolour",
        "backcolour",
        "bold",
        "italic",
        "underline",
        "strikeout",
        "scalex",
        "scaley",
        "spacing",
        "angle",
        "borderstyle",
        "outline",
        "shadow",
        "alignment",
        "marginl",
        "marginr",
        "marginv",
        "encoding",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Default event field order for `[Events]`.
fn default_event_format() -> Vec<String> {
    [
        "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
