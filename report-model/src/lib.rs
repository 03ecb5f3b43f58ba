//! FILENAME: report-model/src/lib.rs
//! PURPOSE: Shared leaf types for the report engine.
//! CONTEXT: This crate holds the data structures a report is authored with:
//! template grids of cells with styles and merged ranges, plus the page
//! geometry the layout runs against. It has no layout logic of its own;
//! the report-engine crate consumes these types.

pub mod cell;
pub mod geometry;
pub mod range;
pub mod style;
pub mod template;

pub use cell::{TemplateCell, MIME_PLAIN_TEXT};
pub use geometry::{PageGeometry, Rect, MARGIN_TOLERANCE, MODEL_DPI};
pub use range::CellRange;
pub use style::{
    BorderLineStyle, BorderStyle, Borders, CellStyle, Color, FontStyle, TextAlign, VerticalAlign,
};
pub use template::{TemplateGrid, DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT};
