//! Cell background fills

use super::Color;

/// Background painted behind a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillStyle {
    #[default]
    None,
    Solid {
        color: Color,
    },
    /// `foreground` draws the pattern over `background`
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },
}

impl FillStyle {
    pub fn solid(color: Color) -> Self {
        FillStyle::Solid { color }
    }

    pub fn is_none(&self) -> bool {
        *self == FillStyle::None
    }
}

/// Patterns a `patternFill` can name. Only the ones LibreOffice prints
/// distinctly are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternType {
    #[default]
    None,
    Solid,
    Gray125,
    Gray0625,
    LightGray,
    MediumGray,
    DarkGray,
}

impl PatternType {
    pub fn xml_value(self) -> &'static str {
        match self {
            PatternType::None => "none",
            PatternType::Solid => "solid",
            PatternType::Gray125 => "gray125",
            PatternType::Gray0625 => "gray0625",
            PatternType::LightGray => "lightGray",
            PatternType::MediumGray => "mediumGray",
            PatternType::DarkGray => "darkGray",
        }
    }
}
