//! Color representation

use std::fmt;

/// Color as stored in SpreadsheetML
///
/// Theme and indexed colors are kept symbolic so a copied cell keeps the
/// exact reference the source workbook used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// ARGB color
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color with tint in hundredths (-100..=100)
    Theme { index: u8, tint: i8 },

    /// Indexed color (legacy palette)
    Indexed(u8),
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    /// Create an opaque RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a: 0xFF, r, g, b }
    }

    /// Create a theme color
    pub const fn theme(index: u8, tint: i8) -> Self {
        Color::Theme { index, tint }
    }

    /// Parse `RRGGBB` or `AARRGGBB`, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::Argb {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => None,
        }
    }

    /// 8-digit ARGB hex for `rgb` attributes, `None` for symbolic colors
    pub fn argb_hex(&self) -> Option<String> {
        match self {
            Color::Argb { a, r, g, b } => Some(format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b)),
            _ => None,
        }
    }

    /// Attributes for a SpreadsheetML color element (`<color .../>`, `<fgColor .../>`)
    pub fn xml_attributes(&self) -> String {
        match self {
            Color::Auto => r#"auto="1""#.to_string(),
            Color::Argb { a, r, g, b } => {
                format!(r#"rgb="{:02X}{:02X}{:02X}{:02X}""#, a, r, g, b)
            }
            Color::Theme { index, tint: 0 } => format!(r#"theme="{}""#, index),
            Color::Theme { index, tint } => {
                format!(r#"theme="{}" tint="{}""#, index, f64::from(*tint) / 100.0)
            }
            Color::Indexed(i) => format!(r#"indexed="{}""#, i),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Argb { .. } => write!(f, "#{}", self.argb_hex().unwrap_or_default()),
            Color::Theme { index, tint } => write!(f, "theme({}, {})", index, tint),
            Color::Indexed(i) => write!(f, "indexed({})", i),
        }
    }
}
