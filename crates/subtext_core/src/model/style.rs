//! Subtitle style types.
//!
//! A [`StyleState`] is an immutable-by-convention value carrying every
//! SubStation style field plus the drawing flag. Inline override tags never
//! mutate a style in place: they build a [`StyleDelta`] and derive a new
//! state with [`StyleState::overridden`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from style name to its base [`StyleState`].
///
/// Consulted by the tag parser for named resets and by format writers for
/// an entry's declared style.
pub type StyleTable = BTreeMap<String, StyleState>;

/// Style name used when an entry does not declare one.
pub const DEFAULT_STYLE_NAME: &str = "Default";

/// A fully resolved set of style attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleState {
    /// Font name.
    pub fontname: String,
    /// Font size.
    pub fontsize: f64,
    /// Primary fill color.
    pub primary_color: Color,
    /// Secondary (karaoke) color.
    pub secondary_color: Color,
    /// Outline color.
    pub outline_color: Color,
    /// Back/shadow color.
    pub back_color: Color,
    /// Bold.
    pub bold: bool,
    /// Italic.
    pub italic: bool,
    /// Underline.
    pub underline: bool,
    /// Strikeout.
    pub strikeout: bool,
    /// Drawing mode: the run's "text" is vector drawing commands, not
    /// displayable text. Never written to style definitions; it only
    /// exists on resolved run styles.
    pub drawing: bool,
    /// Horizontal scale (100 = normal).
    pub scale_x: f64,
    /// Vertical scale (100 = normal).
    pub scale_y: f64,
    /// Spacing between characters.
    pub spacing: f64,
    /// Rotation angle in degrees.
    pub angle: f64,
    /// Border style (1 = outline + shadow, 3 = opaque box).
    pub border_style: i32,
    /// Outline width.
    pub outline: f64,
    /// Shadow depth.
    pub shadow: f64,
    /// Alignment (numpad style: 1-9).
    pub alignment: i32,
    /// Left margin.
    pub margin_l: i32,
    /// Right margin.
    pub margin_r: i32,
    /// Vertical margin.
    pub margin_v: i32,
    /// Encoding (0 = ANSI, 1 = default, etc.).
    pub encoding: i32,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            fontname: "Arial".to_string(),
            fontsize: 20.0,
            primary_color: Color::from_rgb(255, 255, 255),
            secondary_color: Color::from_rgb(255, 0, 0),
            outline_color: Color::from_rgb(0, 0, 0),
            back_color: Color::from_rgb(0, 0, 0),
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            drawing: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 2.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 1,
        }
    }
}

impl StyleState {
    /// Return a copy of `self` with the fields present in `delta` replaced.
    pub fn overridden(&self, delta: &StyleDelta) -> Self {
        let mut s = self.clone();
        if let Some(v) = delta.bold {
            s.bold = v;
        }
        if let Some(v) = delta.italic {
            s.italic = v;
        }
        if let Some(v) = delta.underline {
            s.underline = v;
        }
        if let Some(v) = delta.strikeout {
            s.strikeout = v;
        }
        if let Some(v) = delta.drawing {
            s.drawing = v;
        }
        s
    }
}

/// A partial style: only the fields reachable from inline override tags.
///
/// `None` means "leave the base value alone".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleDelta {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikeout: Option<bool>,
    pub drawing: Option<bool>,
}

impl StyleDelta {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Color in SubStation ABGR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
    /// Alpha component (0 = opaque, 255 = transparent).
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::from_rgb(255, 255, 255)
    }
}

impl Color {
    /// Create from RGB values, opaque.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0 }
    }

    /// Parse a SubStation color string (`&HAABBGGRR` or `&HBBGGRR`).
    pub fn from_substation(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('&').trim_start_matches('H');
        let value = u32::from_str_radix(s, 16).ok()?;
        let a = if s.len() <= 6 {
            0
        } else {
            ((value >> 24) & 0xFF) as u8
        };
        Some(Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
            a,
        })
    }

    /// Render as a SubStation color string (`&HAABBGGRR`).
    pub fn to_substation(&self) -> String {
        format!("&H{:02X}{:02X}{:02X}{:02X}", self.a, self.b, self.g, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overridden_applies_only_present_fields() {
        let base = StyleState {
            bold: true,
            ..Default::default()
        };
        let delta = StyleDelta {
            italic: Some(true),
            ..Default::default()
        };
        let derived = base.overridden(&delta);
        assert!(derived.bold);
        assert!(derived.italic);
        assert!(!derived.underline);
        // The base is untouched.
        assert!(!base.italic);
    }

    #[test]
    fn empty_delta_is_identity() {
        let base = StyleState::default();
        assert_eq!(base.overridden(&StyleDelta::default()), base);
        assert!(StyleDelta::default().is_empty());
    }

    #[test]
    fn color_parse_and_render() {
        let color = Color::from_substation("&H00FFFFFF").unwrap();
        assert_eq!((color.r, color.g, color.b, color.a), (255, 255, 255, 0));

        let color = Color::from_substation("&HFF00FF").unwrap();
        assert_eq!((color.r, color.g, color.b), (255, 0, 255));

        let original = Color { r: 255, g: 128, b: 64, a: 32 };
        let parsed = Color::from_substation(&original.to_substation()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn style_serde_round_trip() {
        let style = StyleState {
            italic: true,
            fontsize: 36.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&style).unwrap();
        let back: StyleState = serde_json::from_str(&json).unwrap();
        assert_eq!(style, back);
    }
}
