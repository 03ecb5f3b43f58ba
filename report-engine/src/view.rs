//! FILENAME: report-engine/src/view.rs
//! PURPOSE: Page materialization: section segments to a flat layout grid.
//! CONTEXT: Each realized row carries a tag naming the section, template
//! row, and data row it came from. Only placeholder content and MIME types
//! are copied here; full formatting is fetched lazily per cell at resolve
//! time, so materializing a page never pays for formatting properties the
//! consumer does not look at.

use crate::definition::{Section, SectionRegistry, SectionType};
use crate::pager::PageLayoutInfo;
use report_model::{CellRange, Rect, MARGIN_TOLERANCE};
use serde::{Deserialize, Serialize};

/// Provenance of one realized row, used for lazy formula resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowTag {
    pub section_idx: usize,
    pub template_row_idx: usize,
    /// 1-based data row the row is evaluated against.
    pub model_row_idx: i32,
}

/// Placeholder cell in a materialized page: the template's content string
/// and MIME type, copied so text draws in the right stacking order before
/// formulas are substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LayoutCell {
    pub content: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRow {
    pub height: i32,
    pub tag: RowTag,
    pub cells: Vec<LayoutCell>,
}

/// One fully positioned page: visible columns, realized rows, and merged
/// ranges, with no remaining section structure beyond the row tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutGrid {
    pub page_rect: Rect,
    pub layout_rect: Rect,
    pub col_widths: Vec<i32>,
    pub rows: Vec<LayoutRow>,
    pub merged: Vec<CellRange>,
}

impl LayoutGrid {
    pub fn empty(page_rect: Rect, layout_rect: Rect) -> Self {
        LayoutGrid {
            page_rect,
            layout_rect,
            col_widths: Vec::new(),
            rows: Vec::new(),
            merged: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_widths.len()
    }

    /// Top edge of row `idx`; `idx == row_count` gives the realized height.
    pub fn row_pos_by_idx(&self, idx: usize) -> i32 {
        let idx = idx.min(self.rows.len());
        self.rows[..idx].iter().map(|r| r.height).sum()
    }

    /// Row containing vertical position `pos`, with the same edge rules as
    /// the template grid: a row spanning [start, end] owns start < pos <=
    /// end, and out-of-range positions clamp.
    pub fn row_idx_by_pos(&self, pos: i32) -> usize {
        if pos <= 0 || self.rows.is_empty() {
            return 0;
        }
        let mut end = 0i32;
        for (idx, row) in self.rows.iter().enumerate() {
            end += row.height;
            if pos <= end {
                return idx;
            }
        }
        self.rows.len() - 1
    }

    pub fn height(&self) -> i32 {
        self.rows.iter().map(|r| r.height).sum()
    }
}

/// Number of template columns visible on the page: column widths
/// accumulate until the total runs more than the tolerance past the
/// printable width; the straddling column is included once, then cut off.
fn visible_col_widths(section: &Section, layout_rect: &Rect) -> Vec<i32> {
    let limit = layout_rect.width + MARGIN_TOLERANCE;
    let mut widths = Vec::new();
    let mut total = 0i32;
    for idx in 0..section.template.col_count() {
        let width = section.template.col_width(idx);
        widths.push(width);
        total += width;
        if total > limit {
            break;
        }
    }
    widths
}

/// Replicates one section occurrence into the grid: for each covered data
/// row, the template's merged ranges (shifted to the target row), row
/// heights, and per-cell placeholder content, every row tagged with its
/// provenance.
fn push_section_rows(
    grid: &mut LayoutGrid,
    section: &Section,
    section_idx: usize,
    model_start: i32,
    model_rows: i32,
) {
    let template = &section.template;
    let source_rows = template.row_count();
    if source_rows == 0 {
        return;
    }

    let col_count = grid.col_widths.len();

    for model_idx in model_start..model_start + model_rows {
        let target_row = grid.rows.len() as u32;

        for range in template.merged_ranges() {
            grid.merged.push(range.shifted(target_row));
        }

        for source_idx in 0..source_rows {
            let mut cells = Vec::with_capacity(col_count);
            for col_idx in 0..col_count {
                let cell = template.get_cell(source_idx as u32, col_idx as u32);
                cells.push(match cell {
                    Some(cell) => LayoutCell {
                        content: cell.content.clone(),
                        mime_type: cell.mime_type.clone(),
                    },
                    None => LayoutCell::default(),
                });
            }

            grid.rows.push(LayoutRow {
                height: template.row_height(source_idx),
                tag: RowTag {
                    section_idx,
                    template_row_idx: source_idx,
                    model_row_idx: model_idx,
                },
                cells,
            });
        }
    }
}

/// Materializes one laid-out page into a flat grid.
pub fn materialize_page(info: &PageLayoutInfo, registry: &SectionRegistry) -> LayoutGrid {
    let mut grid = LayoutGrid::empty(info.page_rect, info.layout_rect);

    // A page with no segments stays blank: no header or footer either.
    if info.segments.is_empty() {
        return grid;
    }

    // Column structure comes from the first section; all bands of one
    // report share it.
    if let Some(first) = registry.get(0) {
        grid.col_widths = visible_col_widths(first, &info.layout_rect);
    }

    // First and last data rows referenced on the page, used as the formula
    // context for the page header and footer.
    let first_model_idx = info.segments.iter().map(|s| s.row_start).min().unwrap_or(1);
    let last_model_idx = info.segments.iter().map(|s| s.row_end).max().unwrap_or(1);

    // The report header goes first. If it alone fills the page, the page
    // header and footer are suppressed for this page only.
    let mut add_page_header_footer = true;
    for segment in &info.segments {
        let section = match registry.get(segment.section_idx) {
            Some(section) if section.section_type == SectionType::ReportHeader => section,
            _ => continue,
        };

        let model_rows = segment.row_end - segment.row_start + 1;
        push_section_rows(&mut grid, section, segment.section_idx, segment.row_start, model_rows);

        if grid.height() >= info.layout_rect.height {
            add_page_header_footer = false;
        }
    }

    if add_page_header_footer {
        for (idx, section) in registry.sections().iter().enumerate() {
            if section.section_type != SectionType::PageHeader {
                continue;
            }
            push_section_rows(&mut grid, section, idx, first_model_idx, 1);
        }
    }

    // Page content, in segment order; the report header is already placed.
    for segment in &info.segments {
        let section = match registry.get(segment.section_idx) {
            Some(section) => section,
            None => continue,
        };
        if section.section_type == SectionType::ReportHeader {
            continue;
        }

        let model_rows = segment.row_end - segment.row_start + 1;
        push_section_rows(&mut grid, section, segment.section_idx, segment.row_start, model_rows);
    }

    // The page footer is bottom-anchored: its top edge must land exactly at
    // printable height minus footer height. The row preceding it absorbs
    // the rounding delta, and anything realized past that point is clipped.
    if add_page_header_footer {
        for (idx, section) in registry.sections().iter().enumerate() {
            if section.section_type != SectionType::PageFooter {
                continue;
            }

            let footer_pos = info.layout_rect.height - section.height();

            if !grid.rows.is_empty() {
                let row_idx = grid.row_idx_by_pos(footer_pos);
                grid.rows.truncate(row_idx + 1);

                let current_footer_pos = grid.row_pos_by_idx(row_idx + 1);
                let last = &mut grid.rows[row_idx];
                last.height -= current_footer_pos - footer_pos;
            }

            push_section_rows(&mut grid, section, idx, last_model_idx, 1);
        }
    }

    grid
}
