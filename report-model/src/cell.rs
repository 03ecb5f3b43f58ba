//! FILENAME: report-model/src/cell.rs
//! PURPOSE: The template cell: authored content plus its MIME type and style.
//! CONTEXT: A template cell holds the text the report author typed. Whether
//! that text is treated as a formula is decided lazily at resolve time, so
//! the cell itself only records content, MIME type, and formatting.

use crate::style::CellStyle;
use serde::{Deserialize, Serialize};

/// MIME type for plain-text cell content. Only cells carrying this type are
/// eligible for formula evaluation; anything else passes through untouched.
pub const MIME_PLAIN_TEXT: &str = "plain/text";

/// One authored cell in a section template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCell {
    pub content: String,
    pub mime_type: String,
    pub style: CellStyle,
}

impl TemplateCell {
    pub fn new() -> Self {
        TemplateCell {
            content: String::new(),
            mime_type: MIME_PLAIN_TEXT.to_string(),
            style: CellStyle::default(),
        }
    }

    pub fn new_text(text: impl Into<String>) -> Self {
        TemplateCell {
            content: text.into(),
            mime_type: MIME_PLAIN_TEXT.to_string(),
            style: CellStyle::default(),
        }
    }

    /// Creates a formula cell. The `=` prefix is added if missing.
    pub fn new_formula(expr: impl Into<String>) -> Self {
        let expr = expr.into();
        let content = if expr.trim_start().starts_with('=') {
            expr
        } else {
            format!("={}", expr)
        };
        TemplateCell {
            content,
            mime_type: MIME_PLAIN_TEXT.to_string(),
            style: CellStyle::default(),
        }
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    /// True when the cell will be evaluated rather than copied through:
    /// plain-text MIME type and content whose first non-whitespace
    /// character is `=`, with at least one character after it.
    pub fn is_formula(&self) -> bool {
        if self.mime_type != MIME_PLAIN_TEXT {
            return false;
        }
        let trimmed = self.content.trim();
        trimmed.len() > 1 && trimmed.starts_with('=')
    }
}

impl Default for TemplateCell {
    fn default() -> Self {
        Self::new()
    }
}
