//! Frame tables: conversion between frame numbers and millisecond timestamps.
//!
//! A [`FrameTable`] is either a constant frame rate (kept as an exact
//! rational so NTSC rates like 23.976 do not drift) or an explicit list of
//! frame start times. All arithmetic is integer-exact, which is what makes
//! the round-trip law `ms_to_frame(frame_to_ms(f, b), b) == f` hold for
//! every in-range frame; the opposite direction is lossy, since many
//! milliseconds fall inside one frame.

use crate::error::{OutOfRange, ParamError};

/// Which edge of a subtitle a timestamp represents.
///
/// A millisecond lying exactly on a frame start belongs to that frame for
/// `Start` queries and to the previous frame for `End` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBoundary {
    /// The timestamp is a subtitle start.
    Start,
    /// The timestamp is a subtitle end.
    End,
}

/// Mapping between frame indices and millisecond timestamps.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameTable {
    /// Constant frame rate, kept as an exact `numerator / denominator`
    /// frames-per-second rational. Extrapolates arbitrarily far in both
    /// directions.
    ConstantRate { numerator: i64, denominator: i64 },

    /// Explicit frame start times in milliseconds, strictly increasing.
    /// Queries outside the listed range are rejected.
    Explicit { starts: Vec<i64> },
}

impl FrameTable {
    /// Build a constant-rate table from a frame rate.
    ///
    /// Common NTSC rates are mapped to their exact rational form
    /// (23.976 becomes 24000/1001); other rates are taken to three
    /// decimal places.
    pub fn from_fps(fps: f64) -> Result<Self, ParamError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ParamError::InvalidFrameRate(fps));
        }
        let (numerator, denominator) = fps_to_fraction(fps);
        Ok(Self::ConstantRate {
            numerator,
            denominator,
        })
    }

    /// Build an explicit table from frame start times.
    ///
    /// The list must be non-empty and strictly increasing.
    pub fn from_frame_starts(starts: Vec<i64>) -> Result<Self, ParamError> {
        if starts.is_empty() {
            return Err(ParamError::EmptyFrameTable);
        }
        if starts.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ParamError::NonMonotonicFrameTable);
        }
        Ok(Self::Explicit { starts })
    }

    /// Convert a millisecond timestamp to a frame number.
    ///
    /// `Start` returns the frame containing `ms`. `End` behaves the same
    /// except that a timestamp exactly on a frame start resolves to the
    /// frame before it, which can be -1 for the very first start.
    ///
    /// Negative `ms` is always out of range. On an explicit table, `ms`
    /// before the first or after the last listed start is out of range;
    /// a constant-rate table extrapolates.
    pub fn ms_to_frame(&self, ms: i64, boundary: TimeBoundary) -> Result<i64, OutOfRange> {
        if ms < 0 {
            return Err(OutOfRange {
                what: "millisecond",
                value: ms,
            });
        }

        let frame = match self {
            Self::ConstantRate {
                numerator,
                denominator,
            } => {
                let f = (ms as i128 * *numerator as i128)
                    .div_euclid(1000 * *denominator as i128) as i64;
                match boundary {
                    TimeBoundary::Start => f,
                    TimeBoundary::End => {
                        if const_frame_start(*numerator, *denominator, f) == ms {
                            f - 1
                        } else {
                            f
                        }
                    }
                }
            }
            Self::Explicit { starts } => {
                let (Some(&first), Some(&last)) = (starts.first(), starts.last()) else {
                    return Err(OutOfRange {
                        what: "millisecond",
                        value: ms,
                    });
                };
                if ms < first || ms > last {
                    return Err(OutOfRange {
                        what: "millisecond",
                        value: ms,
                    });
                }
                let f = starts.partition_point(|&s| s <= ms) as i64 - 1;
                match boundary {
                    TimeBoundary::Start => f,
                    TimeBoundary::End => {
                        if starts[f as usize] == ms {
                            f - 1
                        } else {
                            f
                        }
                    }
                }
            }
        };
        Ok(frame)
    }

    /// Convert a frame number to a millisecond timestamp.
    ///
    /// `Start` returns the first millisecond of the frame; `End` returns
    /// the last millisecond before the next frame starts, i.e.
    /// `frame_to_ms(f + 1, Start) - 1`.
    ///
    /// Explicit tables reject negative frames and frames past the table;
    /// constant-rate tables extrapolate in both directions.
    pub fn frame_to_ms(&self, frame: i64, boundary: TimeBoundary) -> Result<i64, OutOfRange> {
        match self {
            Self::ConstantRate {
                numerator,
                denominator,
            } => Ok(match boundary {
                TimeBoundary::Start => const_frame_start(*numerator, *denominator, frame),
                TimeBoundary::End => const_frame_start(*numerator, *denominator, frame + 1) - 1,
            }),
            Self::Explicit { starts } => {
                let out_of_range = OutOfRange {
                    what: "frame",
                    value: frame,
                };
                if frame < 0 {
                    return Err(out_of_range);
                }
                let last_index = match boundary {
                    TimeBoundary::Start => frame,
                    TimeBoundary::End => frame + 1,
                };
                if last_index as usize >= starts.len() {
                    return Err(out_of_range);
                }
                Ok(match boundary {
                    TimeBoundary::Start => starts[frame as usize],
                    TimeBoundary::End => starts[frame as usize + 1] - 1,
                })
            }
        }
    }
}

/// First integer millisecond belonging to a frame at a constant rate.
fn const_frame_start(numerator: i64, denominator: i64, frame: i64) -> i64 {
    let n = frame as i128 * 1000 * denominator as i128;
    let d = numerator as i128;
    let q = n.div_euclid(d);
    let r = n.rem_euclid(d);
    (q + i128::from(r != 0)) as i64
}

/// Map a frame rate to an exact rational, NTSC-aware.
fn fps_to_fraction(fps: f64) -> (i64, i64) {
    if (fps - 23.976).abs() < 0.01 {
        (24000, 1001)
    } else if (fps - 29.97).abs() < 0.01 {
        (30000, 1001)
    } else if (fps - 59.94).abs() < 0.01 {
        (60000, 1001)
    } else {
        ((fps * 1000.0).round() as i64, 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TimeBoundary::{End, Start};

    #[test]
    fn from_fps_rejects_bad_rates() {
        assert!(FrameTable::from_fps(0.0).is_err());
        assert!(FrameTable::from_fps(-25.0).is_err());
        assert!(FrameTable::from_fps(f64::NAN).is_err());
        assert!(FrameTable::from_fps(f64::INFINITY).is_err());
    }

    #[test]
    fn from_fps_uses_exact_ntsc_rationals() {
        let table = FrameTable::from_fps(23.976).unwrap();
        assert_eq!(
            table,
            FrameTable::ConstantRate {
                numerator: 24000,
                denominator: 1001
            }
        );
    }

    #[test]
    fn from_frame_starts_validation() {
        assert!(FrameTable::from_frame_starts(vec![]).is_err());
        assert!(FrameTable::from_frame_starts(vec![0, 42, 42]).is_err());
        assert!(FrameTable::from_frame_starts(vec![0, 42, 83]).is_ok());
    }

    #[test]
    fn constant_rate_basics() {
        let table = FrameTable::from_fps(25.0).unwrap();
        assert_eq!(table.frame_to_ms(0, Start).unwrap(), 0);
        assert_eq!(table.frame_to_ms(1, Start).unwrap(), 40);
        assert_eq!(table.frame_to_ms(0, End).unwrap(), 39);
        assert_eq!(table.ms_to_frame(0, Start).unwrap(), 0);
        assert_eq!(table.ms_to_frame(39, Start).unwrap(), 0);
        assert_eq!(table.ms_to_frame(40, Start).unwrap(), 1);
        // A timestamp exactly on a frame start is the previous frame as an end.
        assert_eq!(table.ms_to_frame(40, End).unwrap(), 0);
        assert_eq!(table.ms_to_frame(0, End).unwrap(), -1);
        assert_eq!(table.ms_to_frame(41, End).unwrap(), 1);
    }

    #[test]
    fn negative_ms_is_out_of_range() {
        let table = FrameTable::from_fps(25.0).unwrap();
        assert!(table.ms_to_frame(-1, Start).is_err());
        assert!(table.ms_to_frame(-1, End).is_err());
    }

    #[test]
    fn constant_rate_extrapolates_frames() {
        let table = FrameTable::from_fps(25.0).unwrap();
        assert_eq!(table.frame_to_ms(-1, Start).unwrap(), -40);
        assert_eq!(table.frame_to_ms(1_000_000, Start).unwrap(), 40_000_000);
    }

    #[test]
    fn round_trip_law_constant_rate() {
        for fps in [23.976, 24.0, 25.0, 29.97, 30.0, 60.0] {
            let table = FrameTable::from_fps(fps).unwrap();
            for frame in 0..1000 {
                for boundary in [Start, End] {
                    let ms = table.frame_to_ms(frame, boundary).unwrap();
                    assert_eq!(
                        table.ms_to_frame(ms, boundary).unwrap(),
                        frame,
                        "round trip failed for frame {frame} at {fps} fps ({boundary:?})"
                    );
                }
            }
        }
    }

    #[test]
    fn explicit_table_lookup() {
        let table = FrameTable::from_frame_starts(vec![0, 42, 83, 125]).unwrap();
        assert_eq!(table.ms_to_frame(0, Start).unwrap(), 0);
        assert_eq!(table.ms_to_frame(41, Start).unwrap(), 0);
        assert_eq!(table.ms_to_frame(42, Start).unwrap(), 1);
        assert_eq!(table.ms_to_frame(42, End).unwrap(), 0);
        assert_eq!(table.ms_to_frame(125, Start).unwrap(), 3);

        assert_eq!(table.frame_to_ms(1, Start).unwrap(), 42);
        assert_eq!(table.frame_to_ms(1, End).unwrap(), 82);
    }

    #[test]
    fn explicit_table_rejects_out_of_domain() {
        let table = FrameTable::from_frame_starts(vec![0, 42, 83]).unwrap();
        assert!(table.ms_to_frame(84, Start).is_err());
        assert!(table.frame_to_ms(-1, Start).is_err());
        assert!(table.frame_to_ms(3, Start).is_err());
        // End of the last frame needs the next start, which does not exist.
        assert!(table.frame_to_ms(2, End).is_err());
    }

    #[test]
    fn round_trip_law_explicit_table() {
        let starts: Vec<i64> = (0..500).map(|f| f * 1001 * 1000 / 24000).collect();
        let table = FrameTable::from_frame_starts(starts).unwrap();
        for frame in 0..498 {
            for boundary in [Start, End] {
                let ms = table.frame_to_ms(frame, boundary).unwrap();
                assert_eq!(table.ms_to_frame(ms, boundary).unwrap(), frame);
            }
        }
    }
}
