//! Time conversions shared by every subtitle format.
//!
//! All public timing values are integer milliseconds. Conversions to and
//! from frame numbers go through a [`FrameTable`]; conversions to and from
//! text go through the pattern and helpers in this module.
//!
//! # Rounding
//!
//! Fractional milliseconds are rounded half away from zero before any
//! decomposition. This is a deliberate, documented convention so that test
//! expectations are reproducible across platforms.

mod frames;

pub use frames::{FrameTable, TimeBoundary};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::SubtitleError;

/// Pattern matching both SubStation and SubRip timestamps.
pub static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{1,2}):(\d{1,2})[.,](\d{1,3})").expect("valid timestamp pattern")
});

/// Normalized clock components of a millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    /// Hours (unbounded).
    pub h: i64,
    /// Minutes, `0..60`.
    pub m: i64,
    /// Seconds, `0..60`.
    pub s: i64,
    /// Milliseconds, `0..1000`.
    pub ms: i64,
}

/// Round half away from zero to an integer number of milliseconds.
fn round_half_up(ms: f64) -> i64 {
    if ms < 0.0 {
        -((-ms + 0.5).floor() as i64)
    } else {
        (ms + 0.5).floor() as i64
    }
}

/// Convert hours, minutes, seconds to milliseconds.
///
/// Arguments may be positive or negative and need not be normalized
/// (`s = 120.0` is okay). The result is rounded to integer milliseconds.
pub fn times_to_ms(h: f64, m: f64, s: f64, ms: f64) -> i64 {
    round_half_up(ms + s * 1000.0 + m * 60000.0 + h * 3600000.0)
}

/// Convert milliseconds to a normalized [`TimeParts`] tuple.
///
/// The input is rounded to integer milliseconds first. For non-negative
/// input the invariants `0 <= ms < 1000`, `0 <= s < 60` and `0 <= m < 60`
/// hold; negative input pushes the sign into the hours component.
pub fn ms_to_times(ms: f64) -> TimeParts {
    let total = round_half_up(ms);
    let h = total.div_euclid(3_600_000);
    let rem = total.rem_euclid(3_600_000);
    let m = rem / 60_000;
    let rem = rem % 60_000;
    let s = rem / 1000;
    let ms = rem % 1000;
    TimeParts { h, m, s, ms }
}

/// Prettyprint milliseconds to `[-]H:MM:SS[.mmm]`.
///
/// Handles huge and negative times; the sign is emitted once and the
/// components decompose the absolute value.
pub fn ms_to_str(ms: f64, fractions: bool) -> String {
    let total = round_half_up(ms);
    let sgn = if total < 0 { "-" } else { "" };
    let t = ms_to_times(total.abs() as f64);
    if fractions {
        format!("{}{}:{:02}:{:02}.{:03}", sgn, t.h, t.m, t.s, t.ms)
    } else {
        format!("{}{}:{:02}:{:02}", sgn, t.h, t.m, t.s)
    }
}

/// Convert a [`TIMESTAMP`] match to milliseconds.
///
/// The fractional field carries 1 to 3 digits and is scaled to
/// milliseconds by its width (`.5` is 500 ms, `.50` is 500 ms,
/// `.500` is 500 ms).
pub fn timestamp_to_ms(caps: &Captures) -> i64 {
    let h: i64 = caps[1].parse().unwrap_or(0);
    let m: i64 = caps[2].parse().unwrap_or(0);
    let s: i64 = caps[3].parse().unwrap_or(0);
    let frac = &caps[4];
    let ms: i64 = frac.parse::<i64>().unwrap_or(0) * 10i64.pow(3 - frac.len() as u32);
    ms + s * 1000 + m * 60_000 + h * 3_600_000
}

/// Convert a frame-based duration to milliseconds under a constant rate.
///
/// Convenience wrapper building a [`FrameTable`] from `fps`.
pub fn frames_to_ms(frames: i64, fps: f64, boundary: TimeBoundary) -> Result<i64, SubtitleError> {
    let table = FrameTable::from_fps(fps)?;
    Ok(table.frame_to_ms(frames, boundary)?)
}

/// Convert milliseconds to a frame number under a constant rate.
///
/// Convenience wrapper building a [`FrameTable`] from `fps`.
pub fn ms_to_frames(ms: i64, fps: f64, boundary: TimeBoundary) -> Result<i64, SubtitleError> {
    let table = FrameTable::from_fps(fps)?;
    Ok(table.ms_to_frame(ms, boundary)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_to_ms_accepts_unnormalized_components() {
        assert_eq!(times_to_ms(0.0, 0.0, 1.5, 0.0), 1500);
        assert_eq!(times_to_ms(0.0, 0.0, 120.0, 0.0), 120_000);
        assert_eq!(times_to_ms(1.0, 2.0, 3.0, 4.0), 3_723_004);
        assert_eq!(times_to_ms(0.0, 0.0, 0.0, -500.0), -500);
    }

    #[test]
    fn ms_to_times_invariants() {
        for &ms in &[0i64, 1, 999, 1000, 59_999, 60_000, 3_599_999, 3_600_000, 86_399_999] {
            let t = ms_to_times(ms as f64);
            assert!((0..1000).contains(&t.ms));
            assert!((0..60).contains(&t.s));
            assert!((0..60).contains(&t.m));
            let rebuilt = t.ms + t.s * 1000 + t.m * 60_000 + t.h * 3_600_000;
            assert_eq!(rebuilt, ms);
        }
    }

    #[test]
    fn ms_to_times_rounds_half_up() {
        assert_eq!(ms_to_times(0.5).ms, 1);
        assert_eq!(ms_to_times(1.4).ms, 1);
        assert_eq!(ms_to_times(999.5), TimeParts { h: 0, m: 0, s: 1, ms: 0 });
    }

    #[test]
    fn ms_to_str_formats() {
        assert_eq!(ms_to_str(0.0, false), "0:00:00");
        assert_eq!(ms_to_str(3_661_001.0, false), "1:01:01");
        assert_eq!(ms_to_str(3_661_001.0, true), "1:01:01.001");
        assert_eq!(ms_to_str(-1500.0, true), "-0:00:01.500");
        assert_eq!(ms_to_str(360_000_000.0, false), "100:00:00");
    }

    #[test]
    fn timestamp_pattern_and_scaling() {
        let caps = TIMESTAMP.captures("0:00:00.42").unwrap();
        assert_eq!(timestamp_to_ms(&caps), 420);

        let caps = TIMESTAMP.captures("0:00:00.5").unwrap();
        assert_eq!(timestamp_to_ms(&caps), 500);

        let caps = TIMESTAMP.captures("01:02:03,456").unwrap();
        assert_eq!(timestamp_to_ms(&caps), 3_723_456);
    }

    #[test]
    fn fps_wrappers_round_trip() {
        for frame in 0..200 {
            let ms = frames_to_ms(frame, 25.0, TimeBoundary::Start).unwrap();
            assert_eq!(ms_to_frames(ms, 25.0, TimeBoundary::Start).unwrap(), frame);
        }
    }
}
