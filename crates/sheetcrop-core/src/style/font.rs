//! Font settings carried by a cell style

use super::Color;

const DEFAULT_FAMILY: &str = "Calibri";
const DEFAULT_POINTS: f64 = 11.0;

/// Font applied to a cell's text.
///
/// Only the attributes that survive a round trip through LibreOffice's print
/// path are modelled; everything else falls back to the workbook default.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontStyle {
    pub name: String,
    /// Points
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strikethrough: bool,
    pub color: Color,
}

impl Default for FontStyle {
    fn default() -> Self {
        FontStyle {
            name: DEFAULT_FAMILY.to_owned(),
            size: DEFAULT_POINTS,
            bold: false,
            italic: false,
            underline: Underline::default(),
            strikethrough: false,
            color: Color::Auto,
        }
    }
}

impl FontStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        FontStyle {
            name: name.into(),
            ..self
        }
    }
}

impl Eq for FontStyle {}

impl std::hash::Hash for FontStyle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (
            &self.name,
            self.size.to_bits(),
            self.bold,
            self.italic,
            self.underline,
            self.strikethrough,
            self.color,
        )
            .hash(state);
    }
}

/// Underline drawn under a cell's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
}

impl Underline {
    /// Value of `<u val="..">`; `None` writes no element
    pub fn xml_value(self) -> Option<&'static str> {
        match self {
            Underline::Single => Some("single"),
            Underline::Double => Some("double"),
            Underline::None => None,
        }
    }
}
