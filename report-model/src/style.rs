//! FILENAME: report-model/src/style.rs
//! PURPOSE: Formatting properties carried by template cells.
//! CONTEXT: Styles are authored on the template and copied verbatim onto
//! resolved output cells. The layout passes never read them, so they stay
//! a plain value type here rather than part of the engine.

use serde::{Deserialize, Serialize};

/// Horizontal text alignment for cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextAlign {
    #[default]
    General, // Auto: numbers right, text left
    Left,
    Center,
    Right,
}

/// Vertical alignment for cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// RGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8, // 255 = opaque
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn black() -> Self {
        Color::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Color::new(255, 255, 255)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

/// Line style for a single border edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BorderLineStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
}

/// One border edge: line style plus color and width in model units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BorderStyle {
    pub width: u8, // 0 = no border, 1 = thin, 2 = medium, 3 = thick
    pub color: Color,
    pub style: BorderLineStyle,
}

/// Border configuration for all four cell edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Borders {
    pub top: BorderStyle,
    pub right: BorderStyle,
    pub bottom: BorderStyle,
    pub left: BorderStyle,
}

/// Font configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontStyle {
    pub family: String,
    pub size: u8, // Font size in points
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Color,
}

impl Default for FontStyle {
    fn default() -> Self {
        FontStyle {
            family: "Arial".to_string(),
            size: 10,
            bold: false,
            italic: false,
            underline: false,
            color: Color::black(),
        }
    }
}

/// Complete formatting for one template cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CellStyle {
    pub font: FontStyle,
    pub background: Option<Color>,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub borders: Borders,
    pub wrap_text: bool,
}

impl CellStyle {
    pub fn new() -> Self {
        CellStyle::default()
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.font.italic = italic;
        self
    }

    pub fn with_text_align(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }
}
