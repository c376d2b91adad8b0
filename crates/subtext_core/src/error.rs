//! Subtitle error types.

use std::path::PathBuf;

use crate::formats::Format;

/// Errors that can occur during subtitle operations.
#[derive(Debug, thiserror::Error)]
pub enum SubtitleError {
    /// Failed to read subtitle file.
    #[error("Failed to read file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write subtitle file.
    #[error("Failed to write file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File extension has no associated format.
    #[error("Unknown file extension: '{0}'")]
    UnknownExtension(String),

    /// Format identifier has no associated implementation.
    #[error("Unknown format identifier: '{0}'")]
    UnknownFormat(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Format detection error.
    #[error("Detection error: {0}")]
    Detect(#[from] DetectError),

    /// Frame/time conversion error.
    #[error("Time error: {0}")]
    Time(#[from] OutOfRange),

    /// Invalid parameter.
    #[error("Parameter error: {0}")]
    Param(#[from] ParamError),
}

/// A frame or millisecond value outside the representable domain.
///
/// Raised by the frame converters only. The string-rendering layer never
/// raises this: it clamps and logs a warning instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{what} out of range: {value}")]
pub struct OutOfRange {
    /// Which quantity was out of range ("millisecond" or "frame").
    pub what: &'static str,
    /// The offending value.
    pub value: i64,
}

/// Outcome of format auto-detection when no unique format matched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
    /// No adapter recognized the content.
    #[error("No suitable format detected")]
    NoFormatDetected,

    /// More than one adapter recognized the content.
    #[error("Multiple suitable formats detected: {0:?}")]
    Ambiguous(Vec<Format>),
}

/// Invalid caller-supplied parameter.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// Attempted to set a negative subtitle duration.
    #[error("Subtitle duration cannot be negative")]
    NegativeDuration,

    /// Frame rate was zero, negative, or not finite.
    #[error("Frame rate must be positive and finite, got {0}")]
    InvalidFrameRate(f64),

    /// Explicit frame table contained no frame starts.
    #[error("Frame table must contain at least one frame start")]
    EmptyFrameTable,

    /// Explicit frame table timestamps were not strictly increasing.
    #[error("Frame table timestamps must be strictly increasing")]
    NonMonotonicFrameTable,
}

/// Errors that can occur during subtitle parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Invalid or malformed time format.
    #[error("Invalid time format at line {line}: '{value}'")]
    InvalidTime { line: usize, value: String },

    /// Invalid event/dialogue line.
    #[error("Invalid event at line {line}: {message}")]
    InvalidEvent { line: usize, message: String },

    /// Invalid style definition.
    #[error("Invalid style at line {line}: {message}")]
    InvalidStyle { line: usize, message: String },

    /// A frame-based format was read or written without a frame rate.
    #[error("Frame-based content requires a frame rate")]
    MissingFrameRate,
}

impl ParseError {
    /// Create an invalid time error.
    pub fn invalid_time(line: usize, value: impl Into<String>) -> Self {
        Self::InvalidTime {
            line,
            value: value.into(),
        }
    }

    /// Create an invalid event error.
    pub fn invalid_event(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid style error.
    pub fn invalid_style(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidStyle {
            line,
            message: message.into(),
        }
    }
}

/// A styled run that cannot be represented in the target format.
///
/// Writers recover from this per run: the run is dropped, the rest of the
/// line is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Content is not representable in the target format")]
pub struct UnusableContent;
