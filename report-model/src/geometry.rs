//! FILENAME: report-model/src/geometry.rs
//! PURPOSE: Page geometry for report layout.
//! CONTEXT: Defines the page rectangle, margins, and the printable layout
//! area (page minus margins). All distances are integer canvas-model units
//! at MODEL_DPI, so page math stays exact across repeated layout passes.

use serde::{Deserialize, Serialize};

/// Canvas model resolution, in dots per inch.
pub const MODEL_DPI: i32 = 1440;

/// Tolerance used when deciding how many template columns fit on a page:
/// a column may run up to a quarter inch past the right edge of the
/// printable area before it is cut off.
pub const MARGIN_TOLERANCE: i32 = MODEL_DPI / 4;

// US Letter: 8.5in x 11in with 0.75in margins.
pub const LETTER_PAGE_WIDTH: i32 = (MODEL_DPI as f64 * 8.5) as i32;
pub const LETTER_PAGE_HEIGHT: i32 = (MODEL_DPI as f64 * 11.0) as i32;
pub const LETTER_PAGE_MARGIN: i32 = (MODEL_DPI as f64 * 0.75) as i32;

// ISO A4: 8.27in x 11.69in with 2cm (0.7874in) margins.
pub const A4_PAGE_WIDTH: i32 = (MODEL_DPI as f64 * 8.27) as i32;
pub const A4_PAGE_HEIGHT: i32 = (MODEL_DPI as f64 * 11.69) as i32;
pub const A4_PAGE_MARGIN: i32 = (MODEL_DPI as f64 * 0.7874) as i32;

/// An axis-aligned rectangle in canvas-model units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }
}

/// The immutable page configuration for one layout pass: full page size
/// plus the four margins. The printable area is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: i32,
    pub page_height: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_top: i32,
    pub margin_bottom: i32,
}

impl PageGeometry {
    pub fn new(
        page_width: i32,
        page_height: i32,
        margin_left: i32,
        margin_right: i32,
        margin_top: i32,
        margin_bottom: i32,
    ) -> Self {
        PageGeometry {
            page_width,
            page_height,
            margin_left,
            margin_right,
            margin_top,
            margin_bottom,
        }
    }

    pub fn letter() -> Self {
        PageGeometry::new(
            LETTER_PAGE_WIDTH,
            LETTER_PAGE_HEIGHT,
            LETTER_PAGE_MARGIN,
            LETTER_PAGE_MARGIN,
            LETTER_PAGE_MARGIN,
            LETTER_PAGE_MARGIN,
        )
    }

    pub fn a4() -> Self {
        PageGeometry::new(
            A4_PAGE_WIDTH,
            A4_PAGE_HEIGHT,
            A4_PAGE_MARGIN,
            A4_PAGE_MARGIN,
            A4_PAGE_MARGIN,
            A4_PAGE_MARGIN,
        )
    }

    /// The full page rectangle, origin at (0, 0).
    pub fn page_rect(&self) -> Rect {
        Rect::new(0, 0, self.page_width, self.page_height)
    }

    /// The printable area: the page rectangle minus the margins.
    pub fn layout_rect(&self) -> Rect {
        Rect::new(
            self.margin_left,
            self.margin_top,
            self.page_width - self.margin_left - self.margin_right,
            self.page_height - self.margin_top - self.margin_bottom,
        )
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::letter()
    }
}
