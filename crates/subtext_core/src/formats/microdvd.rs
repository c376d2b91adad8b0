//! MicroDVD (.sub) format adapter.
//!
//! MicroDVD is frame-based: each line is `{start}{end}text` with `|` as
//! the line separator, and frame numbers only make sense against a frame
//! rate. The rate comes from [`ReadOptions::fps`]/[`WriteOptions::fps`]
//! or, on read, from the conventional `{1}{1}fps` declaration line.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ParseError, SubtitleError};
use crate::model::{SubtitleEntry, SubtitleTrack};
use crate::times::{FrameTable, TimeBoundary};

use super::{Format, ReadOptions, WriteOptions};

static MICRODVD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{(\d+)\}\{(\d+)\}(.*)$").expect("valid MicroDVD line pattern"));

/// Non-committal format guess for auto-detection.
///
/// Judged on the first non-blank line only.
pub(crate) fn guess(text: &str) -> Option<Format> {
    let first = text.lines().find(|line| !line.trim().is_empty())?;
    MICRODVD_LINE
        .is_match(first.trim())
        .then_some(Format::MicroDvd)
}

/// Parse MicroDVD content into a track.
///
/// Fails with [`ParseError::MissingFrameRate`] when no rate is supplied
/// and the file carries no `{1}{1}fps` declaration.
pub fn read(content: &str, opts: &ReadOptions) -> Result<SubtitleTrack, SubtitleError> {
    let mut fps = opts.fps;
    let mut frame_spans: Vec<(i64, i64, String)> = Vec::new();
    let mut seen_any = false;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        let Some(caps) = MICRODVD_LINE.captures(line) else {
            continue;
        };
        let start: i64 = caps[1]
            .parse()
            .map_err(|_| ParseError::invalid_time(line_num + 1, line))?;
        let end: i64 = caps[2]
            .parse()
            .map_err(|_| ParseError::invalid_time(line_num + 1, line))?;
        let text = &caps[3];

        // The conventional frame rate declaration: first matched line,
        // both frames 1, body parses as a number.
        if !seen_any && start == 1 && end == 1 {
            if let Ok(declared) = text.trim().parse::<f64>() {
                fps = Some(opts.fps.unwrap_or(declared));
                seen_any = true;
                continue;
            }
        }
        seen_any = true;
        frame_spans.push((start, end, text.replace('|', "\\N")));
    }

    let fps = fps.ok_or(ParseError::MissingFrameRate)?;
    let table = FrameTable::from_fps(fps)?;

    let mut track = SubtitleTrack::new();
    for (start_frame, end_frame, text) in frame_spans {
        let start = table.frame_to_ms(start_frame, TimeBoundary::Start)?;
        let end = table.frame_to_ms(end_frame, TimeBoundary::End)?;
        track.events.push(SubtitleEntry::new(start, end, text));
    }
    Ok(track)
}

/// Write a track as MicroDVD.
///
/// Fails with [`ParseError::MissingFrameRate`] when the options carry no
/// frame rate.
pub fn write(track: &SubtitleTrack, opts: &WriteOptions) -> Result<String, SubtitleError> {
    let fps = opts.fps.ok_or(ParseError::MissingFrameRate)?;
    let table = FrameTable::from_fps(fps)?;

    let mut out = String::new();
    for entry in track.events.iter().filter(|e| !e.is_comment()) {
        let start = table.ms_to_frame(entry.start.max(0), TimeBoundary::Start)?;
        let end = table.ms_to_frame(entry.end.max(0), TimeBoundary::End)?;
        let text = entry.plaintext().replace("\\N", "|").replace('\n', "|");
        out.push_str(&format!("{{{start}}}{{{end}}}{text}\n"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts_with_fps(fps: f64) -> ReadOptions<'static> {
        ReadOptions {
            fps: Some(fps),
            ..Default::default()
        }
    }

    #[test]
    fn read_with_explicit_fps() {
        let content = "{0}{25}Hello|world\n{50}{75}Bye\n";
        let track = read(content, &opts_with_fps(25.0)).unwrap();

        assert_eq!(track.events.len(), 2);
        assert_eq!(track.events[0].start, 0);
        // Frame 25 ends just before frame 26 starts.
        assert_eq!(track.events[0].end, 1039);
        assert_eq!(track.events[0].text, "Hello\\Nworld");
        assert_eq!(track.events[1].start, 2000);
    }

    #[test]
    fn read_takes_fps_from_declaration_line() {
        let content = "{1}{1}25.0\n{0}{25}Hello\n";
        let track = read(content, &ReadOptions::default()).unwrap();
        assert_eq!(track.events.len(), 1);
        assert_eq!(track.events[0].start, 0);
    }

    #[test]
    fn read_without_fps_fails() {
        let result = read("{0}{25}Hello\n", &ReadOptions::default());
        assert!(matches!(
            result,
            Err(SubtitleError::Parse(ParseError::MissingFrameRate))
        ));
    }

    #[test]
    fn write_renders_frames() {
        let mut track = SubtitleTrack::new();
        track.events.push(SubtitleEntry::new(0, 1000, "Hi\nthere"));

        let opts = WriteOptions {
            fps: Some(25.0),
            ..Default::default()
        };
        let output = write(&track, &opts).unwrap();
        assert_eq!(output, "{0}{24}Hi|there\n");
    }

    #[test]
    fn write_without_fps_fails() {
        let track = SubtitleTrack::new();
        assert!(write(&track, &WriteOptions::default()).is_err());
    }

    #[test]
    fn frame_round_trip_through_read_and_write() {
        let content = "{10}{40}One\n{100}{150}Two\n";
        let track = read(content, &opts_with_fps(23.976)).unwrap();

        let opts = WriteOptions {
            fps: Some(23.976),
            ..Default::default()
        };
        let written = write(&track, &opts).unwrap();
        assert_eq!(written, content);
    }

    #[test]
    fn guess_looks_at_first_line() {
        assert_eq!(guess("{0}{25}Hello\n"), Some(Format::MicroDvd));
        assert_eq!(guess("\n\n{0}{25}Hello\n"), Some(Format::MicroDvd));
        assert_eq!(guess("1\n00:00:01,000 --> 00:00:02,000\nHi\n"), None);
        assert_eq!(guess(""), None);
    }
}
